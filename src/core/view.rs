//! The map view controller.
//!
//! [`MapView`] owns one engine handle in a single-assignment slot and mirrors
//! the engine's camera into a [`CameraState`] that only changes when the engine
//! reports a move. Clicks on the interaction layer open a popup describing the
//! first feature hit.
//!
//! Engine events are queued on one channel and handled in emit order when the
//! host calls [`MapView::process_events`]. A click is resolved through its
//! coordinate, so camera changes queued after it do not move the hit test.

use crate::{
    core::{camera::CameraState, config::MapViewConfig},
    engine::{EngineFactory, EngineOptions, MapEngine, QueryOptions},
    input::events::{MapEvent, MapEventKind, Subscription},
    ui::popup::{feature_popup_html, Popup, PopupId, PopupOptions},
    Result,
};
use std::fmt;

/// What the view draws: the status line and the container the engine fills
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub camera: CameraState,
    pub container: String,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.camera, f)
    }
}

struct Mounted<E> {
    engine: E,
    // Held for the view's lifetime; dropping the view detaches the engine's listeners
    events: Subscription,
}

pub struct MapView<E: MapEngine> {
    config: MapViewConfig,
    camera: CameraState,
    mounted: Option<Mounted<E>>,
}

impl<E: MapEngine> MapView<E> {
    pub fn new(config: MapViewConfig) -> Self {
        let camera = CameraState::new(config.center_lat_lng(), config.zoom);
        Self {
            config,
            camera,
            mounted: None,
        }
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Creates the engine and subscribes to its move and click events.
    ///
    /// Runs at most once: when a handle already exists the factory is not
    /// called and `Ok(false)` is returned.
    pub fn mount<F>(&mut self, factory: F) -> Result<bool>
    where
        F: EngineFactory<Engine = E>,
    {
        if self.mounted.is_some() {
            log::debug!("Map already initialized; skipping mount");
            return Ok(false);
        }

        let mut engine = factory.create(EngineOptions::from(&self.config))?;
        let events = Subscription::new();
        engine.on(MapEventKind::Move, events.listener());
        engine.on(MapEventKind::Click, events.listener());
        self.mounted = Some(Mounted { engine, events });
        log::info!("Map view mounted in '{}'", self.config.container);
        Ok(true)
    }

    pub fn engine(&self) -> Option<&E> {
        self.mounted.as_ref().map(|mounted| &mounted.engine)
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.mounted.as_mut().map(|mounted| &mut mounted.engine)
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    /// Handles every event the engine queued since the last call, oldest first.
    ///
    /// Returns the popups opened along the way.
    pub fn process_events(&mut self) -> Vec<PopupId> {
        let pending = match &self.mounted {
            Some(mounted) => mounted.events.drain(),
            None => return Vec::new(),
        };

        pending
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    /// Dispatches one engine event. Returns the popup a click opened, if any.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<PopupId> {
        match event {
            MapEvent::Move => {
                self.on_move();
                None
            }
            MapEvent::Click { point, lng_lat } => {
                let mounted = self.mounted.as_mut()?;
                let engine = &mut mounted.engine;

                // Where the clicked coordinate is drawn now
                let target = engine.project(lng_lat);
                log::trace!("Click at {:?} resolves to {:?}", point, target);
                let features = engine.query_rendered_features(
                    target,
                    &QueryOptions::layers([self.config.interaction_layer.as_str()]),
                );
                let feature = features.first()?;

                let anchor = feature.point().unwrap_or_else(|| {
                    log::debug!("Clicked feature is not a point; anchoring at the click");
                    lng_lat
                });
                let id = Popup::new(PopupOptions {
                    offset: self.config.popup_offset,
                    ..PopupOptions::default()
                })
                .set_lng_lat(anchor)
                .set_html(feature_popup_html(feature))
                .add_to(engine);
                Some(id)
            }
        }
    }

    fn on_move(&mut self) {
        if let Some(mounted) = &self.mounted {
            self.camera = CameraState::new(mounted.engine.get_center(), mounted.engine.get_zoom());
        }
    }

    /// The readout for the current camera state
    pub fn render(&self) -> Readout {
        Readout {
            camera: self.camera,
            container: self.config.container.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::{LatLng, Point},
        data::feature::{Feature, Geometry},
        MapError,
    };
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    /// Scripted engine: fixed camera, canned query results
    struct StubEngine {
        center: LatLng,
        zoom: f64,
        features: Vec<Feature>,
        last_query: RefCell<Option<QueryOptions>>,
        last_point: RefCell<Option<Point>>,
        popups: Vec<Popup>,
        events: crate::input::events::EventEmitter,
    }

    impl StubEngine {
        fn new(options: &EngineOptions) -> Self {
            Self {
                center: options.center,
                zoom: options.zoom,
                features: Vec::new(),
                last_query: RefCell::default(),
                last_point: RefCell::default(),
                popups: Vec::new(),
                events: Default::default(),
            }
        }
    }

    impl MapEngine for StubEngine {
        fn get_center(&self) -> LatLng {
            self.center
        }

        fn get_zoom(&self) -> f64 {
            self.zoom
        }

        fn on(&mut self, kind: MapEventKind, listener: crate::input::events::Listener) {
            self.events.register(kind, listener);
        }

        fn project(&self, lng_lat: LatLng) -> Point {
            Point::new(lng_lat.lng, lng_lat.lat)
        }

        fn query_rendered_features(&self, point: Point, options: &QueryOptions) -> Vec<Feature> {
            *self.last_point.borrow_mut() = Some(point);
            *self.last_query.borrow_mut() = Some(options.clone());
            self.features.clone()
        }

        fn add_popup(&mut self, popup: Popup) -> PopupId {
            self.popups.push(popup);
            PopupId(self.popups.len() as u64 - 1)
        }
    }

    fn stub(options: EngineOptions) -> Result<StubEngine> {
        Ok(StubEngine::new(&options))
    }

    fn mounted_view() -> MapView<StubEngine> {
        let mut view = MapView::new(MapViewConfig::default());
        view.mount(stub).unwrap();
        view
    }

    fn click() -> MapEvent {
        MapEvent::Click {
            point: Point::new(10.0, 10.0),
            lng_lat: LatLng::new(42.0, -71.0),
        }
    }

    #[test]
    fn test_initial_readout() {
        let view: MapView<StubEngine> = MapView::new(MapViewConfig::default());
        assert!(!view.is_mounted());
        assert_eq!(
            view.render().to_string(),
            "Longitude: -70.9000 | Latitude: 42.3500 | Zoom: 9.00"
        );
        assert_eq!(view.render().container, "map");
    }

    #[test]
    fn test_mount_is_idempotent() {
        let calls = Rc::new(Cell::new(0));
        let mut view = MapView::new(MapViewConfig::default());

        for _ in 0..3 {
            let calls = Rc::clone(&calls);
            view.mount(move |options: EngineOptions| -> Result<StubEngine> {
                calls.set(calls.get() + 1);
                stub(options)
            })
            .unwrap();
        }

        assert_eq!(calls.get(), 1);
        assert!(view.is_mounted());
    }

    #[test]
    fn test_mount_failure_leaves_view_unmounted() {
        let mut view: MapView<StubEngine> = MapView::new(MapViewConfig::default());
        let result = view.mount(|_: EngineOptions| -> Result<StubEngine> {
            Err(MapError::Engine("no container".to_string()))
        });
        assert!(result.is_err());
        assert!(!view.is_mounted());

        assert!(view.mount(stub).unwrap());
    }

    #[test]
    fn test_move_republishes_camera() {
        let mut view = mounted_view();
        {
            let engine = view.engine_mut().unwrap();
            engine.center = LatLng::new(42.4, -71.0);
            engine.zoom = 10.0;
        }
        // Camera only follows the engine when it reports a move
        assert_eq!(view.camera().longitude(), "-70.9000");

        view.handle_event(MapEvent::Move);
        assert_eq!(
            view.render().to_string(),
            "Longitude: -71.0000 | Latitude: 42.4000 | Zoom: 10.00"
        );
    }

    #[test]
    fn test_click_without_features_opens_nothing() {
        let mut view = mounted_view();
        assert_eq!(view.handle_event(click()), None);
        assert!(view.engine().unwrap().popups.is_empty());

        let query = view.engine().unwrap().last_query.borrow().clone();
        assert_eq!(query, Some(QueryOptions::layers(["interconnection"])));
    }

    #[test]
    fn test_click_uses_first_feature() {
        let mut view = mounted_view();
        view.engine_mut().unwrap().features = vec![
            Feature::new(Geometry::point(-71.06, 42.36))
                .with_property("title", "First")
                .with_property("County", "Suffolk")
                .with_property("State", "MA")
                .with_property("DeveloperName", "Dev A")
                .with_property("PointsofInterconnection", "POI 1"),
            Feature::new(Geometry::point(-70.0, 41.0)).with_property("title", "Second"),
        ];

        let id = view.handle_event(click());
        assert_eq!(id, Some(PopupId(0)));

        let popup = &view.engine().unwrap().popups[0];
        assert_eq!(popup.lng_lat, LatLng::new(42.36, -71.06));
        assert_eq!(popup.offset(), [0.0, -15.0]);
        assert_eq!(
            popup.html,
            "<h3>First</h3><p>Suffolk, MA<br>Dev A<br>POI 1</p>"
        );
    }

    #[test]
    fn test_non_point_feature_anchors_at_click() {
        let mut view = mounted_view();
        view.engine_mut().unwrap().features = vec![Feature::new(Geometry::LineString {
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
        })];

        view.handle_event(click());
        assert_eq!(
            view.engine().unwrap().popups[0].lng_lat,
            LatLng::new(42.0, -71.0)
        );
    }

    #[test]
    fn test_events_before_mount_are_ignored() {
        let mut view: MapView<StubEngine> = MapView::new(MapViewConfig::default());
        assert_eq!(view.handle_event(click()), None);
        view.handle_event(MapEvent::Move);
        assert!(view.process_events().is_empty());
        assert_eq!(view.camera().zoom_text(), "9.00");
    }

    #[test]
    fn test_process_events_drains_queue() {
        let mut view = mounted_view();
        {
            let engine = view.engine_mut().unwrap();
            engine.center = LatLng::new(41.5, -70.25);
            engine.zoom = 7.5;
            engine.events.emit(MapEvent::Move);
        }

        assert!(view.process_events().is_empty());
        assert_eq!(view.camera().longitude(), "-70.2500");
        assert_eq!(view.camera().zoom_text(), "7.50");
    }

    #[test]
    fn test_click_queries_at_clicked_coordinate() {
        let mut view = mounted_view();
        view.handle_event(click());

        // The stub draws (lng, lat) at pixel (lng, lat)
        let point = *view.engine().unwrap().last_point.borrow();
        assert_eq!(point, Some(Point::new(-71.0, 42.0)));
    }

    #[test]
    fn test_process_events_keeps_emit_order() {
        let mut view = mounted_view();
        {
            let engine = view.engine_mut().unwrap();
            engine.features =
                vec![Feature::new(Geometry::point(-71.06, 42.36)).with_property("title", "Hit")];
            engine.center = LatLng::new(41.0, -72.0);
            engine.events.emit(MapEvent::Move);
            engine.events.emit(click());
            engine.events.emit(MapEvent::Move);
        }

        let opened = view.process_events();
        assert_eq!(opened, vec![PopupId(0)]);
        assert_eq!(view.camera().longitude(), "-72.0000");
        assert!(view.process_events().is_empty());
    }
}
