//! # interconnect-map
//!
//! An interactive map of interconnection-queue projects.
//!
//! A [`MapView`] drives a mapping engine through the [`MapEngine`] trait,
//! mirrors the engine's camera into a fixed-precision readout and opens a
//! popup describing the project under a click on the interaction layer.
//! [`NativeEngine`] runs the map in-process; the `wasm` feature adds a
//! mapbox-gl backend for the browser.

pub mod core;
pub mod data;
pub mod engine;
pub mod input;
pub mod prelude;
pub mod spatial;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::CameraState,
    config::MapViewConfig,
    geo::{LatLng, LatLngBounds, Point},
    view::{MapView, Readout},
    viewport::Viewport,
};

pub use engine::{EngineFactory, EngineOptions, MapEngine, NativeEngine, QueryOptions};

#[cfg(feature = "wasm")]
pub use engine::mapbox::MapboxEngine;

pub use input::events::{Listener, MapEvent, MapEventKind, Subscription};

pub use data::{feature::Feature, geojson::FeatureCollection, queue::ProjectRecord};

pub use ui::popup::{Popup, PopupId, PopupOptions};

#[cfg(feature = "egui")]
pub use ui::widget::MapViewWidget;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
