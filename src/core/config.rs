//! Configuration for the map view
//!
//! Everything the view needs to construct its engine is gathered into a
//! [`MapViewConfig`] that is passed in explicitly. Values can come from
//! defaults, the process environment or a JSON document.

use crate::core::{
    constants::{
        ACCESS_TOKEN_ENV, DEFAULT_CONTAINER, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_STYLE,
        DEFAULT_ZOOM, INTERACTION_LAYER, POPUP_OFFSET,
    },
    geo::LatLng,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    /// Credential handed to the hosting service. Not validated here.
    pub access_token: Option<String>,
    /// Opaque style identifier resolved by the engine
    pub style: String,
    /// Initial center as `[lng, lat]`
    pub center: [f64; 2],
    /// Initial zoom
    pub zoom: f64,
    /// Layer queried on click
    pub interaction_layer: String,
    /// Pixel offset applied to popups
    pub popup_offset: [f64; 2],
    /// Host element the engine renders into
    pub container: String,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            style: DEFAULT_STYLE.to_string(),
            center: [DEFAULT_LONGITUDE, DEFAULT_LATITUDE],
            zoom: DEFAULT_ZOOM,
            interaction_layer: INTERACTION_LAYER.to_string(),
            popup_offset: POPUP_OFFSET,
            container: DEFAULT_CONTAINER.to_string(),
        }
    }
}

impl MapViewConfig {
    /// Defaults plus the access token read from `MAPBOX_ACCESS_TOKEN`
    pub fn from_env() -> Self {
        Self::default().with_env_token()
    }

    /// Parses a JSON document; missing fields fall back to defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fills in the access token from the environment unless one is already set
    pub fn with_env_token(mut self) -> Self {
        if self.access_token.is_none() {
            self.access_token = std::env::var(ACCESS_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty());
        }
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_center(mut self, lng: f64, lat: f64) -> Self {
        self.center = [lng, lat];
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_interaction_layer(mut self, layer: impl Into<String>) -> Self {
        self.interaction_layer = layer.into();
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Initial center as a [`LatLng`]
    pub fn center_lat_lng(&self) -> LatLng {
        LatLng::from_lng_lat(self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapViewConfig::default();
        assert_eq!(config.center, [-70.9, 42.35]);
        assert_eq!(config.zoom, 9.0);
        assert_eq!(config.interaction_layer, "interconnection");
        assert_eq!(config.popup_offset, [0.0, -15.0]);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            MapViewConfig::from_json(r#"{"zoom": 11.5, "access_token": "pk.test"}"#).unwrap();
        assert_eq!(config.zoom, 11.5);
        assert_eq!(config.access_token.as_deref(), Some("pk.test"));
        assert_eq!(config.style, DEFAULT_STYLE);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(MapViewConfig::from_json("{zoom").is_err());
    }

    #[test]
    fn test_explicit_token_wins_over_env() {
        let config = MapViewConfig::default()
            .with_access_token("pk.explicit")
            .with_env_token();
        assert_eq!(config.access_token.as_deref(), Some("pk.explicit"));
    }

    #[test]
    fn test_builder_center() {
        let config = MapViewConfig::default().with_center(-71.0, 42.4);
        assert_eq!(config.center_lat_lng(), LatLng::new(42.4, -71.0));
    }
}
