pub mod popup;

#[cfg(feature = "egui")]
pub mod widget;

pub use popup::{feature_popup_html, html_to_text, Popup, PopupId, PopupOptions};

#[cfg(feature = "egui")]
pub use widget::{MapViewWidget, WidgetStyle};
