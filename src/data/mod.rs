pub mod feature;
pub mod geocode;
pub mod geojson;
pub mod queue;
pub mod states;

pub use feature::{Feature, Geometry, Properties};
pub use geojson::FeatureCollection;
pub use queue::ProjectRecord;
