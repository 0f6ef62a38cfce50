//! The mapping engine seam.
//!
//! [`MapEngine`] is the surface the view drives: camera getters, event
//! listeners, projection, rendered-feature queries and popups. [`native::NativeEngine`]
//! implements it in-process; `mapbox::MapboxEngine` (feature `wasm`) forwards
//! to mapbox-gl in the browser.

pub mod native;

#[cfg(feature = "wasm")]
pub mod mapbox;

use crate::{
    core::{
        config::MapViewConfig,
        geo::{LatLng, Point},
    },
    data::feature::Feature,
    input::events::{Listener, MapEventKind},
    ui::popup::{Popup, PopupId},
    Result,
};

pub use native::NativeEngine;

/// Everything needed to construct an engine instance
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Host element the engine renders into
    pub container: String,
    /// Opaque style identifier
    pub style: String,
    pub center: LatLng,
    pub zoom: f64,
    pub access_token: Option<String>,
}

impl From<&MapViewConfig> for EngineOptions {
    fn from(config: &MapViewConfig) -> Self {
        Self {
            container: config.container.clone(),
            style: config.style.clone(),
            center: config.center_lat_lng(),
            zoom: config.zoom,
            access_token: config.access_token.clone(),
        }
    }
}

/// Restricts a rendered-feature query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Layers to search; empty means every layer
    pub layers: Vec<String>,
}

impl QueryOptions {
    pub fn layers<I, S>(layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            layers: layers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn includes(&self, layer: &str) -> bool {
        self.layers.is_empty() || self.layers.iter().any(|l| l == layer)
    }
}

/// A live mapping engine instance
pub trait MapEngine {
    /// Current camera center
    fn get_center(&self) -> LatLng;

    /// Current camera zoom
    fn get_zoom(&self) -> f64;

    /// Feeds events of `kind` to `listener` until its subscription is dropped
    fn on(&mut self, kind: MapEventKind, listener: Listener);

    /// Container pixel currently showing `lng_lat`
    fn project(&self, lng_lat: LatLng) -> Point;

    /// Features drawn at `point` (container pixels), first hit first
    fn query_rendered_features(&self, point: Point, options: &QueryOptions) -> Vec<Feature>;

    /// Attaches a popup to the map
    fn add_popup(&mut self, popup: Popup) -> PopupId;
}

/// Builds an engine from [`EngineOptions`]
pub trait EngineFactory {
    type Engine: MapEngine;

    fn create(self, options: EngineOptions) -> Result<Self::Engine>;
}

impl<F, E> EngineFactory for F
where
    F: FnOnce(EngineOptions) -> Result<E>,
    E: MapEngine,
{
    type Engine = E;

    fn create(self, options: EngineOptions) -> Result<E> {
        self(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let config = MapViewConfig::default()
            .with_access_token("pk.test")
            .with_container("map-root");
        let options = EngineOptions::from(&config);

        assert_eq!(options.container, "map-root");
        assert_eq!(options.center, LatLng::new(42.35, -70.9));
        assert_eq!(options.zoom, 9.0);
        assert_eq!(options.access_token.as_deref(), Some("pk.test"));
    }

    #[test]
    fn test_query_layer_filter() {
        let any = QueryOptions::default();
        assert!(any.includes("whatever"));

        let only = QueryOptions::layers(["interconnection"]);
        assert!(only.includes("interconnection"));
        assert!(!only.includes("roads"));
    }
}
