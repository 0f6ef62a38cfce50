use crate::{
    core::geo::{LatLng, LatLngBounds},
    data::feature::Feature,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root GeoJSON object holding the features of one dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Parses a FeatureCollection document
    pub fn from_str(geojson_str: &str) -> Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    /// Reads a FeatureCollection from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Writes the collection with two-space indentation
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        log::info!("Wrote {} features to {}", self.features.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box of every vertex in the collection
    pub fn bounds(&self) -> Option<LatLngBounds> {
        let mut positions = self
            .features
            .iter()
            .flat_map(|feature| feature.geometry.positions())
            .map(LatLng::from_lng_lat);

        let first = positions.next()?;
        let mut bounds = LatLngBounds::new(first, first);
        for position in positions {
            bounds.extend(&position);
        }
        Some(bounds)
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Downloads a FeatureCollection over HTTP(S)
pub async fn fetch_feature_collection(url: &str) -> Result<FeatureCollection> {
    log::debug!("Fetching features from {}", url);
    let response = reqwest::get(url).await?.error_for_status()?;
    let text = response.text().await?;
    FeatureCollection::from_str(&text)
}

/// Loads a FeatureCollection from a URL or a file path
#[cfg(feature = "tokio-runtime")]
pub async fn load_feature_collection(source: &str) -> Result<FeatureCollection> {
    let collection = if is_remote(source) {
        fetch_feature_collection(source).await?
    } else {
        let text = tokio::fs::read_to_string(source).await?;
        FeatureCollection::from_str(&text)?
    };
    log::info!("Loaded {} features from {}", collection.len(), source);
    Ok(collection)
}
