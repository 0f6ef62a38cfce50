//! Interconnection-queue project records and their conversion to map features.

use crate::{
    data::{
        feature::{Feature, Geometry},
        geojson::FeatureCollection,
        states::{clean_county, expand_state_name},
    },
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// One project row of the interconnection queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Developer Name", default)]
    pub developer_name: Option<String>,
    #[serde(rename = "Points of Interconnection", default)]
    pub points_of_interconnection: Option<String>,
    /// Geocoded location, written as `[lng, lat]` or `(lng, lat)`; empty until geocoded
    #[serde(rename = "Locations", default)]
    pub locations: String,
}

impl ProjectRecord {
    /// Strips "County" and punctuation from the county and spells out the state
    pub fn normalize(&mut self) {
        self.county = clean_county(&self.county);
        self.state = expand_state_name(&self.state).to_string();
    }

    /// `"County, State"` search text for the geocoder
    pub fn place_query(&self) -> String {
        format!(
            "{}, {}",
            clean_county(&self.county),
            expand_state_name(&self.state)
        )
    }

    /// Builds the feature the map's interaction layer serves for this project
    pub fn to_feature(&self) -> Result<Feature> {
        let [lng, lat] = parse_locations(&self.locations).map_err(|e| {
            MapError::InvalidCoordinates(format!("{} ({})", e, self.project_name))
        })?;

        Ok(Feature::new(Geometry::point(lng, lat))
            .with_property("title", self.project_name.clone())
            .with_property("County", self.county.clone())
            .with_property("State", self.state.clone())
            .with_property(
                "DeveloperName",
                self.developer_name.clone().unwrap_or_default(),
            )
            .with_property(
                "PointsofInterconnection",
                self.points_of_interconnection.clone().unwrap_or_default(),
            ))
    }
}

/// Parses a bracketed `lng, lat` pair
pub fn parse_locations(text: &str) -> std::result::Result<[f64; 2], String> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix(['[', '('])
        .and_then(|rest| rest.strip_suffix([']', ')']))
        .ok_or_else(|| format!("location {:?} is not bracketed", text))?;

    let values = inner
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("location {:?}: {}", text, e))?;

    match values.as_slice() {
        [lng, lat] if (-180.0..=180.0).contains(lng) && (-90.0..=90.0).contains(lat) => {
            Ok([*lng, *lat])
        }
        [_, _] => Err(format!("location {:?} is out of range", text)),
        _ => Err(format!("location {:?} must hold two numbers", text)),
    }
}

/// Converts every record; the first bad location aborts the conversion
pub fn build_feature_collection(records: &[ProjectRecord]) -> Result<FeatureCollection> {
    let features = records
        .iter()
        .map(ProjectRecord::to_feature)
        .collect::<Result<Vec<_>>>()?;
    log::debug!("Built {} interconnection features", features.len());
    Ok(FeatureCollection::new(features))
}

/// Reads records from a JSON array
pub fn records_from_json(json: &str) -> Result<Vec<ProjectRecord>> {
    Ok(serde_json::from_str(json)?)
}
