use crate::{
    core::{geo::Point, view::MapView},
    engine::{native::NativeEngine, MapEngine},
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};

/// Zoom change per pixel of wheel scroll
const ZOOM_PER_SCROLL: f64 = 0.002;

#[derive(Debug, Clone)]
pub struct WidgetStyle {
    pub background_color: Color32,
    pub feature_color: Color32,
    pub interaction_color: Color32,
    pub feature_radius: f32,
    pub readout_background: Color32,
    pub readout_text: Color32,
    pub popup_background: Color32,
    pub popup_border: Color32,
    pub popup_text: Color32,
    pub popup_padding: f32,
    pub popup_rounding: f32,
    pub font_id: FontId,
}

impl Default for WidgetStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(230, 230, 230),
            feature_color: Color32::from_rgb(120, 120, 120),
            interaction_color: Color32::from_rgb(227, 84, 38),
            feature_radius: 5.0,
            readout_background: Color32::from_rgba_unmultiplied(35, 55, 75, 230),
            readout_text: Color32::WHITE,
            popup_background: Color32::WHITE,
            popup_border: Color32::GRAY,
            popup_text: Color32::BLACK,
            popup_padding: 8.0,
            popup_rounding: 4.0,
            font_id: FontId::proportional(13.0),
        }
    }
}

/// egui front end for a [`MapView`] over the native engine
pub struct MapViewWidget {
    view: MapView<NativeEngine>,
    style: WidgetStyle,
}

impl MapViewWidget {
    pub fn new(view: MapView<NativeEngine>) -> Self {
        Self {
            view,
            style: WidgetStyle::default(),
        }
    }

    pub fn with_style(mut self, style: WidgetStyle) -> Self {
        self.style = style;
        self
    }

    pub fn view(&self) -> &MapView<NativeEngine> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut MapView<NativeEngine> {
        &mut self.view
    }

    /// Feeds this frame's input to the engine, then draws the map, popups and readout
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        ui.painter()
            .rect_filled(rect, 0.0, self.style.background_color);

        let Some(engine) = self.view.engine_mut() else {
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Map not initialized",
                self.style.font_id.clone(),
                self.style.popup_text,
            );
            return response;
        };

        engine.resize(Point::new(rect.width() as f64, rect.height() as f64));
        let to_local = |pos: Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                engine.pan_by(Point::new(delta.x as f64, delta.y as f64));
            }
        }

        if response.hovered() {
            let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_delta.abs() > 0.1 {
                let around = ui.input(|i| i.pointer.hover_pos()).map(to_local);
                let zoom = engine.get_zoom() + scroll_delta as f64 * ZOOM_PER_SCROLL;
                engine.zoom_to(zoom, around);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                engine.click(to_local(pos));
            }
        }

        self.view.process_events();

        let painter = ui.painter_at(rect);
        if let Some(engine) = self.view.engine() {
            self.paint_features(&painter, rect, engine);
            self.paint_popups(ui, &painter, rect, engine);
        }
        self.paint_readout(ui, &painter, rect);

        response
    }

    fn to_screen(rect: Rect, point: Point) -> Pos2 {
        rect.min + Vec2::new(point.x as f32, point.y as f32)
    }

    fn paint_features(&self, painter: &egui::Painter, rect: Rect, engine: &NativeEngine) {
        let interaction_layer = self.view.config().interaction_layer.as_str();

        for layer_id in engine.layer_ids() {
            let color = if layer_id == interaction_layer {
                self.style.interaction_color
            } else {
                self.style.feature_color
            };
            let Some(features) = engine.layer_features(layer_id) else {
                continue;
            };

            for feature in features {
                for position in feature.geometry.positions() {
                    let pixel = engine
                        .viewport()
                        .lat_lng_to_pixel(&crate::core::geo::LatLng::from_lng_lat(position));
                    let pos = Self::to_screen(rect, pixel);
                    if rect.expand(self.style.feature_radius).contains(pos) {
                        painter.circle_filled(pos, self.style.feature_radius, color);
                    }
                }
            }
        }
    }

    fn paint_popups(&self, ui: &Ui, painter: &egui::Painter, rect: Rect, engine: &NativeEngine) {
        for (_, popup) in engine.popups() {
            let text = popup.text();
            let text_size = ui
                .fonts(|f| {
                    f.layout_no_wrap(
                        text.clone(),
                        self.style.font_id.clone(),
                        self.style.popup_text,
                    )
                })
                .size();
            let popup_size = text_size + Vec2::splat(self.style.popup_padding * 2.0);

            // Box sits above its anchor, horizontally centered
            let anchor = Self::to_screen(rect, engine.popup_anchor(popup));
            let popup_rect = Rect::from_min_size(
                Pos2::new(anchor.x - popup_size.x / 2.0, anchor.y - popup_size.y),
                popup_size,
            );

            painter.rect_filled(
                popup_rect,
                self.style.popup_rounding,
                self.style.popup_background,
            );
            painter.rect_stroke(
                popup_rect,
                self.style.popup_rounding,
                Stroke::new(1.0, self.style.popup_border),
            );
            painter.text(
                popup_rect.shrink(self.style.popup_padding).min,
                Align2::LEFT_TOP,
                text,
                self.style.font_id.clone(),
                self.style.popup_text,
            );
        }
    }

    fn paint_readout(&self, ui: &Ui, painter: &egui::Painter, rect: Rect) {
        let text = self.view.render().to_string();
        let text_size = ui
            .fonts(|f| {
                f.layout_no_wrap(
                    text.clone(),
                    self.style.font_id.clone(),
                    self.style.readout_text,
                )
            })
            .size();

        let margin = 12.0;
        let padding = 6.0;
        let readout_rect = Rect::from_min_size(
            rect.min + Vec2::splat(margin),
            text_size + Vec2::splat(padding * 2.0),
        );
        painter.rect_filled(readout_rect, 4.0, self.style.readout_background);
        painter.text(
            readout_rect.min + Vec2::splat(padding),
            Align2::LEFT_TOP,
            text,
            self.style.font_id.clone(),
            self.style.readout_text,
        );
    }
}
