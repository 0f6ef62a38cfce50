//! Prelude module for common interconnect-map types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use interconnect_map::prelude::*;`

pub use crate::core::{
    camera::CameraState,
    config::MapViewConfig,
    geo::{LatLng, LatLngBounds, Point},
    view::{MapView, Readout},
    viewport::Viewport,
};

pub use crate::engine::{EngineFactory, EngineOptions, MapEngine, NativeEngine, QueryOptions};

pub use crate::input::events::{Listener, MapEvent, MapEventKind, Subscription};

pub use crate::data::{
    feature::{Feature, Geometry},
    geojson::FeatureCollection,
    queue::ProjectRecord,
};

pub use crate::ui::popup::{feature_popup_html, Popup, PopupId, PopupOptions};

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapViewWidget, WidgetStyle};

pub use crate::{Error as MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
