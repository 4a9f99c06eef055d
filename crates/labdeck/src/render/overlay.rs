//! Painting for the draw overlay and its control strip.

use eframe::egui::{self, Color32, RichText, Stroke};

use crate::draw::{self, DrawOverlay, PALETTE, PEN_WIDTH};
use crate::theme::Theme;

/// Swatch outline for the selected pen color.
const SELECTED_OUTLINE: Color32 = Color32::from_rgb(0xBF, 0xA0, 0x32);

/// What the user clicked in the draw controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayCommand {
    SetColor(Color32),
    Clear,
    Save,
    Close,
}

/// Paint every retained stroke with round joins.
pub fn paint_strokes(painter: &egui::Painter, overlay: &DrawOverlay) {
    for stroke in overlay.strokes() {
        let pen = Stroke::new(PEN_WIDTH, stroke.color);
        for (a, b) in stroke.segments() {
            painter.line_segment([a, b], pen);
            painter.circle_filled(b, PEN_WIDTH / 2.0, stroke.color);
        }
    }
}

/// Palette swatches plus Clear / Save / Close buttons.
pub fn draw_controls(ui: &mut egui::Ui, overlay: &DrawOverlay, theme: &Theme) -> Option<OverlayCommand> {
    let mut command = None;
    egui::Frame::new()
        .fill(Theme::with_opacity(theme.code_background, 0.95))
        .corner_radius(8.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                for (name, color) in PALETTE {
                    let selected = overlay.color() == color;
                    let (rect, response) =
                        ui.allocate_exact_size(egui::vec2(24.0, 24.0), egui::Sense::click());
                    ui.painter().circle_filled(rect.center(), 9.0, color);
                    if selected {
                        ui.painter().circle_stroke(
                            rect.center(),
                            11.0,
                            Stroke::new(2.5, SELECTED_OUTLINE),
                        );
                    }
                    response.widget_info(|| {
                        egui::WidgetInfo::selected(egui::WidgetType::RadioButton, true, selected, name)
                    });
                    if response.on_hover_text(name).clicked() {
                        command = Some(OverlayCommand::SetColor(color));
                    }
                }
                ui.separator();
                let clear = egui::Button::new("Clear");
                if ui.add_enabled(!overlay.is_blank(), clear).clicked() {
                    command = Some(OverlayCommand::Clear);
                }
                if ui.button("Save").clicked() {
                    command = Some(OverlayCommand::Save);
                }
                if ui.button(RichText::new("\u{2715} Close")).clicked() {
                    command = Some(OverlayCommand::Close);
                }
            });
        });
    command
}

/// Swatch name for a color, if it is in the palette.
pub fn color_name(color: Color32) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(_, c)| *c == color)
        .map(|(name, _)| *name)
}

/// Pen color that stands out against the theme background.
pub fn default_pen_color(theme: &Theme) -> Color32 {
    if theme.is_dark() {
        PALETTE[4].1
    } else {
        PALETTE[0].1
    }
}

/// Config value to pen color, falling back to the theme default.
pub fn pen_color_from_config(value: Option<&str>, theme: &Theme) -> Color32 {
    match value.map(|v| (v, draw::parse_hex_color(v))) {
        Some((_, Some(color))) => color,
        Some((raw, None)) => {
            tracing::warn!(value = raw, "ignoring invalid pen color");
            default_pen_color(theme)
        }
        None => default_pen_color(theme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_color_from_config() {
        let light = Theme::light();
        assert_eq!(pen_color_from_config(None, &light), PALETTE[0].1);
        assert_eq!(pen_color_from_config(Some("#e03030"), &light), PALETTE[1].1);
        assert_eq!(pen_color_from_config(Some("crimson"), &light), PALETTE[0].1);
    }

    #[test]
    fn test_dark_theme_default_pen_is_visible() {
        let dark = Theme::dark();
        let pen = pen_color_from_config(None, &dark);
        assert_eq!(color_name(pen), Some("Gold"));
        assert_ne!(pen, dark.background);
        assert_eq!(pen_color_from_config(Some("crimson"), &dark), pen);
        assert_eq!(
            pen_color_from_config(Some("#000000"), &dark),
            PALETTE[0].1,
            "an explicit color still wins"
        );
    }

    #[test]
    fn test_color_name() {
        assert_eq!(color_name(PALETTE[4].1), Some("Gold"));
        assert_eq!(color_name(Color32::from_rgb(1, 2, 3)), None);
    }
}
