use crate::{
    core::{constants::POPUP_OFFSET, geo::LatLng},
    data::feature::Feature,
    engine::MapEngine,
};
use std::fmt;

/// Identifies a popup attached to an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupOptions {
    /// Pixel offset from the anchor; negative y lifts the popup
    pub offset: [f64; 2],
    /// Close when the map is clicked
    pub close_on_click: bool,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            offset: POPUP_OFFSET,
            close_on_click: true,
        }
    }
}

/// An overlay showing HTML content at a map coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub options: PopupOptions,
    pub lng_lat: LatLng,
    pub html: String,
}

impl Popup {
    pub fn new(options: PopupOptions) -> Self {
        Self {
            options,
            lng_lat: LatLng::default(),
            html: String::new(),
        }
    }

    pub fn set_lng_lat(mut self, lng_lat: LatLng) -> Self {
        self.lng_lat = lng_lat;
        self
    }

    pub fn set_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Attaches the popup to `engine`
    pub fn add_to<E: MapEngine + ?Sized>(self, engine: &mut E) -> PopupId {
        engine.add_popup(self)
    }

    pub fn offset(&self) -> [f64; 2] {
        self.options.offset
    }

    /// Content with markup flattened for surfaces that cannot render HTML
    pub fn text(&self) -> String {
        html_to_text(&self.html)
    }
}

/// Popup body for an interconnection project. Field values are not escaped.
pub fn feature_popup_html(feature: &Feature) -> String {
    format!(
        "<h3>{}</h3><p>{}, {}<br>{}<br>{}</p>",
        feature.property_text("title"),
        feature.property_text("County"),
        feature.property_text("State"),
        feature.property_text("DeveloperName"),
        feature.property_text("PointsofInterconnection"),
    )
}

/// Drops tags, turning line-breaking ones into newlines
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('>') else {
            // Unterminated tag: keep it literally
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + len]
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if matches!(tag.as_str(), "br" | "br/" | "p" | "h1" | "h2" | "h3" | "h4" | "div")
            && !text.is_empty()
            && !text.ends_with('\n')
        {
            text.push('\n');
        }
        rest = &rest[start + len + 1..];
    }
    text.push_str(rest);

    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feature::Geometry;

    fn project() -> Feature {
        Feature::new(Geometry::point(-71.06, 42.36))
            .with_property("title", "Harbor Solar")
            .with_property("County", "Suffolk")
            .with_property("State", "MA")
            .with_property("DeveloperName", "Bay Energy LLC")
            .with_property("PointsofInterconnection", "Mystic 345kV")
    }

    #[test]
    fn test_feature_popup_html() {
        assert_eq!(
            feature_popup_html(&project()),
            "<h3>Harbor Solar</h3><p>Suffolk, MA<br>Bay Energy LLC<br>Mystic 345kV</p>"
        );
    }

    #[test]
    fn test_missing_fields_render_undefined() {
        let html = feature_popup_html(&Feature::new(Geometry::point(0.0, 0.0)));
        assert_eq!(
            html,
            "<h3>undefined</h3><p>undefined, undefined<br>undefined<br>undefined</p>"
        );
    }

    #[test]
    fn test_html_to_text() {
        let text = html_to_text(&feature_popup_html(&project()));
        assert_eq!(
            text,
            "Harbor Solar\nSuffolk, MA\nBay Energy LLC\nMystic 345kV"
        );
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[test]
    fn test_default_options() {
        let popup = Popup::new(PopupOptions::default())
            .set_lng_lat(LatLng::new(42.36, -71.06))
            .set_html("<b>hi</b>");
        assert_eq!(popup.offset(), [0.0, -15.0]);
        assert!(popup.options.close_on_click);
        assert_eq!(popup.text(), "hi");
        assert_eq!(PopupId(3).to_string(), "popup-3");
    }
}
