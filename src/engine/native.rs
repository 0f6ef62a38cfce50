use crate::{
    core::{
        constants::DEFAULT_HIT_RADIUS,
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::feature::Feature,
    engine::{EngineOptions, MapEngine, QueryOptions},
    input::events::{EventEmitter, Listener, MapEvent, MapEventKind},
    prelude::HashMap,
    spatial::index::{SpatialIndex, SpatialItem},
    ui::popup::{Popup, PopupId},
    MapError, Result,
};

/// Default container size until the host reports one
const DEFAULT_SIZE: Point = Point { x: 1024.0, y: 768.0 };

/// A named set of features drawn on the map
struct FeatureLayer {
    id: String,
    features: Vec<Feature>,
    /// Every vertex, pointing back at its feature
    index: SpatialIndex<usize>,
}

impl FeatureLayer {
    fn new(id: String, features: Vec<Feature>) -> Self {
        let items = features
            .iter()
            .enumerate()
            .flat_map(|(i, feature)| {
                feature
                    .geometry
                    .positions()
                    .into_iter()
                    .map(move |position| SpatialItem::new(LatLng::from_lng_lat(position), i))
            })
            .collect();

        Self {
            id,
            features,
            index: SpatialIndex::from_items(items),
        }
    }
}

/// In-process engine: a Web Mercator viewport over indexed feature layers
pub struct NativeEngine {
    options: EngineOptions,
    viewport: Viewport,
    layers: Vec<FeatureLayer>,
    popups: Vec<(PopupId, Popup)>,
    next_popup_id: u64,
    events: EventEmitter,
    hit_radius: f64,
}

impl NativeEngine {
    pub fn new(options: EngineOptions) -> Result<Self> {
        if !options.center.is_valid() || !options.zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "center {:?} zoom {}",
                options.center, options.zoom
            )));
        }
        if options.access_token.is_none() {
            log::warn!("No access token configured; hosted styles will not load");
        }

        log::info!(
            "Creating map in '{}' with style {} at ({:.4}, {:.4}) zoom {:.2}",
            options.container,
            options.style,
            options.center.lng,
            options.center.lat,
            options.zoom
        );

        Ok(Self {
            viewport: Viewport::new(options.center, options.zoom, DEFAULT_SIZE),
            options,
            layers: Vec::new(),
            popups: Vec::new(),
            next_popup_id: 0,
            events: EventEmitter::new(),
            hit_radius: DEFAULT_HIT_RADIUS,
        })
    }

    /// Factory entry point, usable directly with `MapView::mount`
    pub fn create(options: EngineOptions) -> Result<Self> {
        Self::new(options)
    }

    pub fn with_hit_radius(mut self, radius: f64) -> Self {
        self.hit_radius = radius.max(0.0);
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Adds a layer on top of the existing ones
    pub fn add_layer(&mut self, id: impl Into<String>, features: Vec<Feature>) -> Result<()> {
        let id = id.into();
        if self.layers.iter().any(|layer| layer.id == id) {
            return Err(MapError::Layer(format!("layer '{}' already exists", id)));
        }
        let layer = FeatureLayer::new(id, features);
        log::debug!(
            "Adding layer '{}' with {} features ({} indexed positions)",
            layer.id,
            layer.features.len(),
            layer.index.len()
        );
        self.layers.push(layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, id: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id != id);
        before != self.layers.len()
    }

    /// Layer ids, bottom to top
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.id.as_str()).collect()
    }

    pub fn layer_features(&self, id: &str) -> Option<&[Feature]> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .map(|layer| layer.features.as_slice())
    }

    /// Moves the camera without animation
    pub fn jump_to(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
        self.events.emit(MapEvent::Move);
    }

    /// Drags the map content by `delta` pixels
    pub fn pan_by(&mut self, delta: Point) {
        self.viewport.pan(delta);
        self.events.emit(MapEvent::Move);
    }

    /// Zooms, keeping the coordinate under `around` in place
    pub fn zoom_to(&mut self, zoom: f64, around: Option<Point>) {
        self.viewport.zoom_to(zoom, around);
        self.events.emit(MapEvent::Move);
    }

    pub fn resize(&mut self, size: Point) {
        if size == self.viewport.size {
            return;
        }
        self.viewport.set_size(size);
        self.events.emit(MapEvent::Move);
    }

    /// Delivers a primary click at `point`.
    ///
    /// Popups that close on click are removed before listeners see the event.
    pub fn click(&mut self, point: Point) {
        self.popups.retain(|(_, popup)| !popup.options.close_on_click);
        let lng_lat = self.viewport.pixel_to_lat_lng(&point);
        self.events.emit(MapEvent::Click { point, lng_lat });
    }

    /// Attached popups in the order they were added
    pub fn popups(&self) -> impl Iterator<Item = (PopupId, &Popup)> {
        self.popups.iter().map(|(id, popup)| (*id, popup))
    }

    pub fn remove_popup(&mut self, id: PopupId) -> Option<Popup> {
        let position = self.popups.iter().position(|(popup_id, _)| *popup_id == id)?;
        Some(self.popups.remove(position).1)
    }

    /// Container position of a popup's box anchor (coordinate plus offset)
    pub fn popup_anchor(&self, popup: &Popup) -> Point {
        let [dx, dy] = popup.offset();
        self.viewport
            .lat_lng_to_pixel(&popup.lng_lat)
            .add(&Point::new(dx, dy))
    }

    fn hit_bounds(&self, point: Point) -> LatLngBounds {
        let r = Point::new(self.hit_radius, self.hit_radius);
        let north_west = self.viewport.pixel_to_lat_lng(&point.subtract(&r));
        let south_east = self.viewport.pixel_to_lat_lng(&point.add(&r));
        LatLngBounds::from_coords(south_east.lat, north_west.lng, north_west.lat, south_east.lng)
    }
}

impl MapEngine for NativeEngine {
    fn get_center(&self) -> LatLng {
        self.viewport.center
    }

    fn get_zoom(&self) -> f64 {
        self.viewport.zoom
    }

    fn on(&mut self, kind: MapEventKind, listener: Listener) {
        self.events.register(kind, listener);
    }

    fn project(&self, lng_lat: LatLng) -> Point {
        self.viewport.lat_lng_to_pixel(&lng_lat)
    }

    fn query_rendered_features(&self, point: Point, options: &QueryOptions) -> Vec<Feature> {
        let bounds = self.hit_bounds(point);
        let mut hits = Vec::new();

        // Topmost layer first
        for layer in self.layers.iter().rev() {
            if !options.includes(&layer.id) || layer.index.is_empty() {
                continue;
            }

            let mut nearest: HashMap<usize, f64> = HashMap::default();
            for item in layer.index.query(&bounds) {
                let distance = self
                    .viewport
                    .lat_lng_to_pixel(&item.position)
                    .distance_to(&point);
                if distance > self.hit_radius {
                    continue;
                }
                let entry = nearest.entry(item.data).or_insert(distance);
                if distance < *entry {
                    *entry = distance;
                }
            }

            let mut layer_hits: Vec<_> = nearest.into_iter().collect();
            layer_hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            hits.extend(
                layer_hits
                    .into_iter()
                    .map(|(i, _)| layer.features[i].clone()),
            );
        }

        hits
    }

    fn add_popup(&mut self, popup: Popup) -> PopupId {
        let id = PopupId(self.next_popup_id);
        self.next_popup_id += 1;
        log::debug!(
            "Opening {} at ({:.4}, {:.4})",
            id,
            popup.lng_lat.lng,
            popup.lng_lat.lat
        );
        self.popups.push((id, popup));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::config::MapViewConfig, data::feature::Geometry, input::events::Subscription,
        ui::popup::PopupOptions,
    };

    fn engine() -> NativeEngine {
        NativeEngine::new(EngineOptions::from(&MapViewConfig::default())).unwrap()
    }

    fn site(title: &str, lng: f64, lat: f64) -> Feature {
        Feature::new(Geometry::point(lng, lat)).with_property("title", title)
    }

    #[test]
    fn test_rejects_invalid_center() {
        let mut options = EngineOptions::from(&MapViewConfig::default());
        options.center = LatLng::new(120.0, 0.0);
        assert!(matches!(
            NativeEngine::new(options),
            Err(MapError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_duplicate_layer_is_rejected() {
        let mut engine = engine();
        engine.add_layer("interconnection", vec![]).unwrap();
        assert!(engine.add_layer("interconnection", vec![]).is_err());
        assert_eq!(engine.layer_ids(), vec!["interconnection"]);
        assert!(engine.remove_layer("interconnection"));
        assert!(engine.layer_ids().is_empty());
    }

    #[test]
    fn test_query_hits_feature_under_point() {
        let mut engine = engine();
        engine
            .add_layer(
                "interconnection",
                vec![site("center", -70.9, 42.35), site("far", -72.0, 41.0)],
            )
            .unwrap();

        let point = engine.viewport().lat_lng_to_pixel(&LatLng::new(42.35, -70.9));
        let hits = engine.query_rendered_features(
            point.add(&Point::new(3.0, -2.0)),
            &QueryOptions::layers(["interconnection"]),
        );

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].property_text("title"), "center");
    }

    #[test]
    fn test_query_filters_layers_and_orders_top_first() {
        let mut engine = engine();
        engine
            .add_layer("substations", vec![site("substation", -70.9, 42.35)])
            .unwrap();
        engine
            .add_layer("interconnection", vec![site("project", -70.9, 42.35)])
            .unwrap();
        let point = engine.viewport().lat_lng_to_pixel(&LatLng::new(42.35, -70.9));

        let all = engine.query_rendered_features(point, &QueryOptions::default());
        let titles: Vec<_> = all.iter().map(|f| f.property_text("title")).collect();
        assert_eq!(titles, vec!["project", "substation"]);

        let only = engine.query_rendered_features(point, &QueryOptions::layers(["substations"]));
        assert_eq!(only.len(), 1);

        let unknown = engine.query_rendered_features(point, &QueryOptions::layers(["missing"]));
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_query_misses_outside_radius() {
        let mut engine = engine().with_hit_radius(5.0);
        engine
            .add_layer("interconnection", vec![site("center", -70.9, 42.35)])
            .unwrap();
        let point = engine.viewport().lat_lng_to_pixel(&LatLng::new(42.35, -70.9));

        let hits = engine.query_rendered_features(
            point.add(&Point::new(6.0, 0.0)),
            &QueryOptions::layers(["interconnection"]),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_camera_changes_emit_move() {
        let mut engine = engine();
        let moves = Subscription::new();
        engine.on(MapEventKind::Move, moves.listener());

        engine.pan_by(Point::new(10.0, 0.0));
        engine.zoom_to(10.0, None);
        engine.jump_to(LatLng::new(42.4, -71.0), 10.0);
        engine.resize(Point::new(640.0, 480.0));
        engine.resize(Point::new(640.0, 480.0));

        assert_eq!(moves.drain().len(), 4);
        assert_eq!(engine.get_center(), LatLng::new(42.4, -71.0));
        assert_eq!(engine.get_zoom(), 10.0);
    }

    #[test]
    fn test_click_closes_popups_and_emits() {
        let mut engine = engine();
        let clicks = Subscription::new();
        engine.on(MapEventKind::Click, clicks.listener());

        let sticky = Popup::new(PopupOptions {
            close_on_click: false,
            ..PopupOptions::default()
        })
        .add_to(&mut engine);
        Popup::new(PopupOptions::default()).add_to(&mut engine);
        assert_eq!(engine.popups().count(), 2);

        engine.click(Point::new(512.0, 384.0));

        let ids: Vec<_> = engine.popups().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![sticky]);
        match clicks.try_next() {
            Some(MapEvent::Click { point, lng_lat }) => {
                assert_eq!(point, Point::new(512.0, 384.0));
                assert!((lng_lat.lng - -70.9).abs() < 1e-9);
                assert!((lng_lat.lat - 42.35).abs() < 1e-9);
            }
            other => panic!("expected click, got {:?}", other),
        }
    }

    #[test]
    fn test_popup_anchor_applies_offset() {
        let engine = engine();
        let popup = Popup::new(PopupOptions::default()).set_lng_lat(engine.get_center());
        let anchor = engine.popup_anchor(&popup);
        assert!((anchor.x - 512.0).abs() < 1e-6);
        assert!((anchor.y - 369.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_follows_camera() {
        let mut engine = engine();
        let boston = LatLng::new(42.36, -71.06);
        let before = engine.project(boston);

        engine.pan_by(Point::new(40.0, -25.0));
        let after = engine.project(boston);
        assert!((after.x - (before.x + 40.0)).abs() < 1e-6);
        assert!((after.y - (before.y - 25.0)).abs() < 1e-6);

        let center = engine.project(engine.get_center());
        assert!((center.x - 512.0).abs() < 1e-6);
        assert!((center.y - 384.0).abs() < 1e-6);
    }

    #[test]
    fn test_remove_popup() {
        let mut engine = engine();
        let id = Popup::new(PopupOptions::default()).add_to(&mut engine);
        assert!(engine.remove_popup(id).is_some());
        assert!(engine.remove_popup(id).is_none());
    }
}
