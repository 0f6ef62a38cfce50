//! Coordinates for queue projects, looked up from their county and state.
//!
//! Queries go to a Nominatim-compatible search endpoint. A lookup that finds
//! nothing or fails leaves the record without a location.

use crate::{MapError, Result};
#[cfg(feature = "tokio-runtime")]
use crate::{data::queue::ProjectRecord, prelude::HashMap};
use serde::Deserialize;
use std::time::Duration;

/// Public Nominatim search endpoint
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Pause between requests; the public endpoint allows one per second
pub const DEFAULT_GEOCODE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
    interval: Duration,
}

impl Geocoder {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("interconnect-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            interval: DEFAULT_GEOCODE_INTERVAL,
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Best match for `place` as `[lng, lat]`
    pub async fn locate(&self, place: &str) -> Result<Option<[f64; 2]>> {
        log::debug!("Geocoding '{}'", place);
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_search_response(&body)
    }
}

/// Reads the first hit of a search response as `[lng, lat]`
pub fn parse_search_response(body: &str) -> Result<Option<[f64; 2]>> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)?;
    let Some(hit) = hits.first() else {
        return Ok(None);
    };

    let number = |text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|e| MapError::ParseError(format!("coordinate {:?}: {}", text, e)))
    };
    Ok(Some([number(&hit.lon)?, number(&hit.lat)?]))
}

/// Writes a position the way `ProjectRecord::locations` stores it
pub fn format_locations([lng, lat]: [f64; 2]) -> String {
    format!("[{}, {}]", lng, lat)
}

/// Fills in `locations` for every record that has none.
///
/// Places shared by several records are looked up once. Returns how many
/// records received a location.
#[cfg(feature = "tokio-runtime")]
pub async fn geocode_records(geocoder: &Geocoder, records: &mut [ProjectRecord]) -> usize {
    let mut found: HashMap<String, Option<[f64; 2]>> = HashMap::default();
    let mut located = 0;

    for record in records
        .iter_mut()
        .filter(|record| record.locations.trim().is_empty())
    {
        let place = record.place_query();
        let position = match found.get(&place) {
            Some(cached) => *cached,
            None => {
                if !found.is_empty() {
                    tokio::time::sleep(geocoder.interval).await;
                }
                let position = match geocoder.locate(&place).await {
                    Ok(position) => position,
                    Err(e) => {
                        log::warn!("Geocoding '{}' failed: {}", place, e);
                        None
                    }
                };
                found.insert(place.clone(), position);
                position
            }
        };

        match position {
            Some(position) => {
                record.locations = format_locations(position);
                located += 1;
            }
            None => log::warn!("No location for '{}' ({})", record.project_name, place),
        }
    }

    log::info!("Geocoded {} records with {} lookups", located, found.len());
    located
}
