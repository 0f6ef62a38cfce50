use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE},
    geo::{LatLng, Point},
};

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: Self::normalize(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    fn normalize(center: LatLng) -> LatLng {
        LatLng::new(LatLng::clamp_lat(center.lat), LatLng::wrap_lng(center.lng))
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = Self::normalize(center);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Gets the world size in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the current zoom
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        lat_lng.to_mercator_unit().multiply(self.world_size())
    }

    /// Unprojects world pixel coordinates back to LatLng at the current zoom
    pub fn unproject(&self, pixel: &Point) -> LatLng {
        LatLng::from_mercator_unit(pixel.multiply(1.0 / self.world_size()))
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project(&self.center);
        self.project(lat_lng)
            .subtract(&origin)
            .add(&self.size.multiply(0.5))
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center);
        let world = pixel.subtract(&self.size.multiply(0.5)).add(&origin);
        self.unproject(&world)
    }

    /// Pans the viewport so content moves by `delta` pixels (drag semantics)
    pub fn pan(&mut self, delta: Point) {
        let center_px = self.project(&self.center).subtract(&delta);
        let center = self.unproject(&center_px);
        self.set_center(center);
    }

    /// Zooms the viewport, keeping the coordinate under `focus_point` fixed when given
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        match focus_point {
            Some(focus) => {
                let focus_lat_lng = self.pixel_to_lat_lng(&focus);
                self.zoom = new_zoom;
                // Shift the center so the focus coordinate lands back under the cursor
                let drift = self.lat_lng_to_pixel(&focus_lat_lng).subtract(&focus);
                let center_px = self.project(&self.center).add(&drift);
                let center = self.unproject(&center_px);
                self.set_center(center);
            }
            None => self.zoom = new_zoom,
        }
    }
}
