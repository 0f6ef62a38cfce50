//! mapbox-gl backend for the browser.
//!
//! The page must load `mapbox-gl.js` so that `mapboxgl` is a global before
//! [`MapboxEngine::new`] runs.

use crate::{
    core::geo::{LatLng, Point},
    data::feature::Feature,
    engine::{EngineOptions, MapEngine, QueryOptions},
    input::events::{EventEmitter, Listener, MapEvent, MapEventKind},
    ui::popup::{Popup, PopupId},
    MapError, Result,
};
use serde_json::{json, Value};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::prelude::*;

mod ffi {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = mapboxgl)]
        pub type Map;

        #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
        pub fn new(options: &JsValue) -> Map;

        #[wasm_bindgen(method, js_name = getCenter)]
        pub fn get_center(this: &Map) -> LngLat;

        #[wasm_bindgen(method, js_name = getZoom)]
        pub fn get_zoom(this: &Map) -> f64;

        #[wasm_bindgen(method)]
        pub fn on(this: &Map, event: &str, listener: &Closure<dyn FnMut(JsValue)>);

        #[wasm_bindgen(method)]
        pub fn project(this: &Map, lng_lat: &JsValue) -> JsValue;

        #[wasm_bindgen(method, js_name = queryRenderedFeatures)]
        pub fn query_rendered_features(
            this: &Map,
            point: &JsValue,
            options: &JsValue,
        ) -> js_sys::Array;

        pub type LngLat;

        #[wasm_bindgen(method, getter)]
        pub fn lng(this: &LngLat) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn lat(this: &LngLat) -> f64;

        #[wasm_bindgen(js_namespace = mapboxgl)]
        pub type Popup;

        #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
        pub fn new(options: &JsValue) -> Popup;

        #[wasm_bindgen(method, js_name = setLngLat)]
        pub fn set_lng_lat(this: &Popup, lng_lat: &JsValue) -> Popup;

        #[wasm_bindgen(method, js_name = setHTML)]
        pub fn set_html(this: &Popup, html: &str) -> Popup;

        #[wasm_bindgen(method, js_name = addTo)]
        pub fn add_to(this: &Popup, map: &Map) -> Popup;

        #[wasm_bindgen(method, js_name = isOpen)]
        pub fn is_open(this: &Popup) -> bool;

        #[wasm_bindgen(method)]
        pub fn remove(this: &Popup) -> Popup;
    }
}

fn to_js(value: &Value) -> Result<JsValue> {
    js_sys::JSON::parse(&value.to_string())
        .map_err(|e| MapError::Engine(format!("cannot build JS value: {:?}", e)))
}

fn number(target: &JsValue, path: &[&str]) -> f64 {
    let mut current = target.clone();
    for key in path {
        current = js_sys::Reflect::get(&current, &JsValue::from_str(key)).unwrap_or(JsValue::NULL);
    }
    current.as_f64().unwrap_or(f64::NAN)
}

/// Engine handle backed by a `mapboxgl.Map`
pub struct MapboxEngine {
    map: ffi::Map,
    events: Rc<RefCell<EventEmitter>>,
    /// Popups opened through this engine that mapbox-gl has not closed yet
    popups: Vec<(PopupId, ffi::Popup)>,
    next_popup_id: u64,
    // Keeps the JS listeners alive for the engine's lifetime
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl MapboxEngine {
    pub fn new(options: EngineOptions) -> Result<Self> {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        let mapboxgl = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl"))
            .ok()
            .filter(|value| !value.is_undefined())
            .ok_or_else(|| MapError::Engine("mapboxgl is not loaded".to_string()))?;

        let token = options.access_token.clone().unwrap_or_default();
        if token.is_empty() {
            log::warn!("No access token configured; mapbox-gl will refuse hosted styles");
        }
        js_sys::Reflect::set(
            &mapboxgl,
            &JsValue::from_str("accessToken"),
            &JsValue::from_str(&token),
        )
        .map_err(|e| MapError::Engine(format!("cannot set access token: {:?}", e)))?;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| MapError::Engine("no document".to_string()))?;
        if document.get_element_by_id(&options.container).is_none() {
            return Err(MapError::Engine(format!(
                "container '#{}' not found",
                options.container
            )));
        }

        let map = ffi::Map::new(&to_js(&json!({
            "container": options.container,
            "style": options.style,
            "center": options.center.to_lng_lat(),
            "zoom": options.zoom,
        }))?);
        log::info!("mapbox-gl map created in '{}'", options.container);

        let events = Rc::new(RefCell::new(EventEmitter::new()));

        let move_events = Rc::clone(&events);
        let on_move = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            move_events.borrow_mut().emit(MapEvent::Move);
        });
        map.on(MapEventKind::Move.as_str(), &on_move);

        let click_events = Rc::clone(&events);
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let point = Point::new(number(&event, &["point", "x"]), number(&event, &["point", "y"]));
            let lng_lat = LatLng::new(
                number(&event, &["lngLat", "lat"]),
                number(&event, &["lngLat", "lng"]),
            );
            click_events
                .borrow_mut()
                .emit(MapEvent::Click { point, lng_lat });
        });
        map.on(MapEventKind::Click.as_str(), &on_click);

        Ok(Self {
            map,
            events,
            popups: Vec::new(),
            next_popup_id: 0,
            listeners: vec![on_move, on_click],
        })
    }

    /// Factory entry point, usable directly with `MapView::mount`
    pub fn create(options: EngineOptions) -> Result<Self> {
        Self::new(options)
    }

    /// Runs `callback` after every `kind` event, once the engine's own
    /// listeners have queued it. Hosts use this to drain the view.
    pub fn after(&mut self, kind: MapEventKind, mut callback: impl FnMut() + 'static) {
        let listener = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| callback());
        self.map.on(kind.as_str(), &listener);
        self.listeners.push(listener);
    }

    /// Ids of the popups still on the map
    pub fn open_popups(&mut self) -> Vec<PopupId> {
        self.prune_closed_popups();
        self.popups.iter().map(|(id, _)| *id).collect()
    }

    /// Closes a popup. Returns false if it was already gone.
    pub fn remove_popup(&mut self, id: PopupId) -> bool {
        self.prune_closed_popups();
        match self.popups.iter().position(|(popup_id, _)| *popup_id == id) {
            Some(position) => {
                self.popups.remove(position).1.remove();
                true
            }
            None => false,
        }
    }

    // Drops handles mapbox-gl already closed (close on click, close button)
    fn prune_closed_popups(&mut self) {
        self.popups.retain(|(_, popup)| popup.is_open());
    }
}

impl MapEngine for MapboxEngine {
    fn get_center(&self) -> LatLng {
        let center = self.map.get_center();
        LatLng::new(center.lat(), center.lng())
    }

    fn get_zoom(&self) -> f64 {
        self.map.get_zoom()
    }

    fn on(&mut self, kind: MapEventKind, listener: Listener) {
        self.events.borrow_mut().register(kind, listener);
    }

    fn project(&self, lng_lat: LatLng) -> Point {
        match to_js(&json!(lng_lat.to_lng_lat())) {
            Ok(lng_lat) => {
                let point = self.map.project(&lng_lat);
                Point::new(number(&point, &["x"]), number(&point, &["y"]))
            }
            Err(e) => {
                log::warn!("Cannot project {:?}: {}", lng_lat, e);
                Point::new(f64::NAN, f64::NAN)
            }
        }
    }

    fn query_rendered_features(&self, point: Point, options: &QueryOptions) -> Vec<Feature> {
        let query = if options.layers.is_empty() {
            Ok(JsValue::UNDEFINED)
        } else {
            to_js(&json!({ "layers": options.layers }))
        };
        let (point, query) = match (to_js(&json!([point.x, point.y])), query) {
            (Ok(point), Ok(query)) => (point, query),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Skipping feature query: {}", e);
                return Vec::new();
            }
        };

        self.map
            .query_rendered_features(&point, &query)
            .iter()
            .filter_map(|raw| {
                let text: String = js_sys::JSON::stringify(&raw).ok()?.into();
                match serde_json::from_str::<Feature>(&text) {
                    Ok(feature) => Some(feature),
                    Err(e) => {
                        log::debug!("Ignoring unreadable feature: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    fn add_popup(&mut self, popup: Popup) -> PopupId {
        self.prune_closed_popups();
        let id = PopupId(self.next_popup_id);
        self.next_popup_id += 1;

        let options = json!({
            "offset": popup.options.offset,
            "closeOnClick": popup.options.close_on_click,
        });
        match (to_js(&options), to_js(&json!(popup.lng_lat.to_lng_lat()))) {
            (Ok(options), Ok(lng_lat)) => {
                let handle = ffi::Popup::new(&options)
                    .set_lng_lat(&lng_lat)
                    .set_html(&popup.html)
                    .add_to(&self.map);
                self.popups.push((id, handle));
            }
            (Err(e), _) | (_, Err(e)) => log::warn!("Cannot open {}: {}", id, e),
        }
        id
    }
}
