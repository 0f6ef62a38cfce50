//! Browser entry point for the interconnection map.
//!
//! Mounts a [`MapView`] over mapbox-gl into `#map` and keeps the `#sidebar`
//! readout in sync. Every `move` and `click` the map fires is drained through
//! the view right after the engine queues it, so popups open from inside the
//! click dispatch.
//!
//! ```text
//! cargo build --example wasm_viewer --features wasm --target wasm32-unknown-unknown
//! wasm-bindgen --target web --out-dir demos/pkg target/wasm32-unknown-unknown/debug/examples/wasm_viewer.wasm
//! ```
//!
//! `demos/index.html` loads mapbox-gl.js and the generated module.

use interconnect_map::{MapEventKind, MapView, MapViewConfig, MapboxEngine, Readout};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::prelude::*;

/// Element the readout is written into
const SIDEBAR: &str = "sidebar";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    console_log!("interconnect-map viewer loaded");
}

/// The mounted map, owned by the page
#[wasm_bindgen]
pub struct InterconnectMap {
    view: Rc<RefCell<MapView<MapboxEngine>>>,
}

#[wasm_bindgen]
impl InterconnectMap {
    /// Creates the map in `#map`. Only the first call on a page builds an engine.
    #[wasm_bindgen(constructor)]
    pub fn new(access_token: Option<String>) -> Result<InterconnectMap, JsValue> {
        let mut config = MapViewConfig::default();
        if let Some(token) = access_token {
            config = config.with_access_token(token);
        }

        let view = Rc::new(RefCell::new(MapView::new(config)));
        view.borrow_mut()
            .mount(MapboxEngine::create)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        for kind in [MapEventKind::Move, MapEventKind::Click] {
            let weak = Rc::downgrade(&view);
            let mut guard = view.borrow_mut();
            if let Some(engine) = guard.engine_mut() {
                engine.after(kind, move || {
                    let Some(view) = weak.upgrade() else {
                        return;
                    };
                    // Busy means Rust is already on the stack; the next event drains the queue
                    if let Ok(mut view) = view.try_borrow_mut() {
                        sync(&mut view);
                    }
                });
            }
        }

        render_readout(&view.borrow().render());
        Ok(InterconnectMap { view })
    }

    /// The current status line
    pub fn readout(&self) -> String {
        self.view.borrow().render().to_string()
    }

    /// Number of popups still on the map
    #[wasm_bindgen(js_name = openPopupCount)]
    pub fn open_popup_count(&self) -> usize {
        self.view
            .borrow_mut()
            .engine_mut()
            .map(|engine| engine.open_popups().len())
            .unwrap_or(0)
    }
}

fn sync(view: &mut MapView<MapboxEngine>) {
    for id in view.process_events() {
        console_log!("opened {}", id);
    }
    render_readout(&view.render());
}

fn render_readout(readout: &Readout) {
    let sidebar = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(SIDEBAR));
    match sidebar {
        Some(sidebar) => sidebar.set_text_content(Some(&readout.to_string())),
        None => console_log!("no #{} element for the readout", SIDEBAR),
    }
}
