use crate::core::geo::LatLng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Named attribute fields of a feature
pub type Properties = Map<String, Value>;

/// Geometry of a feature. Popups anchor on `Point` geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    MultiPoint { coordinates: Vec<[f64; 2]> },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lng, lat],
        }
    }

    /// Every vertex, in GeoJSON `[lng, lat]` order
    pub fn positions(&self) -> Vec<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.clone()
            }
            Geometry::Polygon { coordinates } => coordinates.iter().flatten().copied().collect(),
        }
    }
}

/// A queryable geographic object, GeoJSON compatible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Properties,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Properties::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The coordinate of a `Point` geometry
    pub fn point(&self) -> Option<LatLng> {
        match &self.geometry {
            Geometry::Point { coordinates } => Some(LatLng::from_lng_lat(*coordinates)),
            _ => None,
        }
    }

    /// Text of a property as a template literal would print it.
    ///
    /// Strings come out unquoted, other values as JSON text and missing
    /// keys as `undefined`. Nothing is escaped.
    pub fn property_text(&self, key: &str) -> String {
        match self.properties.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => "undefined".to_string(),
        }
    }
}
