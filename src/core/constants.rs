//! Defaults for the interconnection map view and the native engine.
//! Keeping them in a single place makes it easier to tweak view-wide magic numbers.

/// Initial camera longitude.
pub const DEFAULT_LONGITUDE: f64 = -70.9;

/// Initial camera latitude.
pub const DEFAULT_LATITUDE: f64 = 42.35;

/// Initial camera zoom.
pub const DEFAULT_ZOOM: f64 = 9.0;

/// Hosted style the map renders with.
pub const DEFAULT_STYLE: &str = "mapbox://styles/derekjw99/cllfob9fk01rz01qkb3to8w9v";

/// The only layer whose features open a popup on click.
pub const INTERACTION_LAYER: &str = "interconnection";

/// Popup offset from its anchor, in pixels (negative y is up).
pub const POPUP_OFFSET: [f64; 2] = [0.0, -15.0];

/// Id of the host element the engine renders into.
pub const DEFAULT_CONTAINER: &str = "map";

/// Environment variable holding the hosting service access token.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Decimal places shown for longitude and latitude in the readout.
pub const COORDINATE_PRECISION: usize = 4;

/// Decimal places shown for zoom in the readout.
pub const ZOOM_PRECISION: usize = 2;

/// World tile size in pixels at zoom 0 (vector-tile convention).
pub const TILE_SIZE: f64 = 512.0;

/// Zoom range the native engine accepts.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Distance in pixels within which a click hits a point feature.
pub const DEFAULT_HIT_RADIUS: f64 = 8.0;
