//! Freehand annotation overlay.
//!
//! Strokes are kept as point lists in window coordinates rather than burned
//! into a pixel buffer, so a window resize repaints them instead of losing
//! them.

use eframe::egui::{Color32, Pos2, Vec2};

pub const PEN_WIDTH: f32 = 2.0;

/// Swatches offered in the draw controls.
pub const PALETTE: [(&str, Color32); 5] = [
    ("Black", Color32::from_rgb(0x00, 0x00, 0x00)),
    ("Red", Color32::from_rgb(0xE0, 0x30, 0x30)),
    ("Blue", Color32::from_rgb(0x1E, 0x50, 0xC8)),
    ("Green", Color32::from_rgb(0x1E, 0x8A, 0x5A)),
    ("Gold", Color32::from_rgb(0xBF, 0xA0, 0x32)),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Pos2>,
    pub color: Color32,
}

impl Stroke {
    /// Consecutive line segments making up the stroke.
    pub fn segments(&self) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

#[derive(Debug, Clone)]
pub struct DrawOverlay {
    active: bool,
    color: Color32,
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    size: Vec2,
}

impl Default for DrawOverlay {
    fn default() -> Self {
        Self::new(PALETTE[0].1)
    }
}

impl DrawOverlay {
    pub fn new(color: Color32) -> Self {
        Self {
            active: false,
            color,
            strokes: Vec::new(),
            current: None,
            size: Vec2::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn open(&mut self) {
        self.active = true;
    }

    /// Hide the overlay. Strokes stay for the next time it opens.
    pub fn close(&mut self) {
        self.end();
        self.active = false;
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    /// Applies to strokes begun after this call.
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    /// Pointer down. Ignored while the overlay is hidden.
    pub fn begin(&mut self, pos: Pos2) {
        if !self.active {
            return;
        }
        self.end();
        self.current = Some(Stroke {
            points: vec![pos],
            color: self.color,
        });
    }

    /// Pointer move. Returns the new segment to paint, if a stroke is open.
    pub fn extend(&mut self, pos: Pos2) -> Option<(Pos2, Pos2)> {
        let stroke = self.current.as_mut()?;
        let last = *stroke.points.last()?;
        if last == pos {
            return None;
        }
        stroke.points.push(pos);
        Some((last, pos))
    }

    /// Pointer up or pointer left the surface.
    pub fn end(&mut self) {
        if let Some(stroke) = self.current.take() {
            if stroke.points.len() >= 2 {
                self.strokes.push(stroke);
            }
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.strokes.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.strokes.is_empty() && self.current.is_none()
    }

    /// Finished strokes followed by the one in progress.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().chain(self.current.as_ref())
    }

    /// Track the window size. Returns true when it changed.
    pub fn resize(&mut self, size: Vec2) -> bool {
        if self.size == size {
            return false;
        }
        tracing::debug!(
            width = size.x,
            height = size.y,
            strokes = self.strokes.len(),
            "overlay resized"
        );
        self.size = size;
        true
    }
}

/// Parse `#rrggbb` into a color.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn open_overlay() -> DrawOverlay {
        let mut overlay = DrawOverlay::default();
        overlay.open();
        overlay
    }

    #[test]
    fn test_stroke_is_continuous() {
        let mut overlay = open_overlay();
        let (a, b, c) = (pos2(10.0, 10.0), pos2(20.0, 15.0), pos2(30.0, 40.0));
        overlay.begin(a);
        assert_eq!(overlay.extend(b), Some((a, b)));
        assert_eq!(overlay.extend(c), Some((b, c)));
        overlay.end();

        let strokes: Vec<&Stroke> = overlay.strokes().collect();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points, vec![a, b, c]);
        let segments: Vec<(Pos2, Pos2)> = strokes[0].segments().collect();
        assert_eq!(segments, vec![(a, b), (b, c)]);
    }

    #[test]
    fn test_clear_empties_canvas() {
        let mut overlay = open_overlay();
        overlay.begin(pos2(0.0, 0.0));
        overlay.extend(pos2(5.0, 5.0));
        overlay.end();
        overlay.begin(pos2(1.0, 1.0));
        overlay.extend(pos2(2.0, 2.0));
        overlay.clear();
        assert!(overlay.is_blank());
        assert_eq!(overlay.strokes().count(), 0);
        assert!(overlay.extend(pos2(3.0, 3.0)).is_none());
    }

    #[test]
    fn test_inactive_overlay_ignores_pointer() {
        let mut overlay = DrawOverlay::default();
        overlay.begin(pos2(0.0, 0.0));
        assert!(overlay.extend(pos2(5.0, 5.0)).is_none());
        overlay.end();
        assert!(overlay.is_blank());
    }

    #[test]
    fn test_move_without_press_draws_nothing() {
        let mut overlay = open_overlay();
        assert!(overlay.extend(pos2(5.0, 5.0)).is_none());
        assert!(overlay.is_blank());
    }

    #[test]
    fn test_single_click_leaves_no_stroke() {
        let mut overlay = open_overlay();
        overlay.begin(pos2(4.0, 4.0));
        overlay.end();
        assert!(overlay.is_blank());
    }

    #[test]
    fn test_color_applies_to_later_strokes() {
        let mut overlay = open_overlay();
        overlay.begin(pos2(0.0, 0.0));
        overlay.extend(pos2(1.0, 1.0));
        overlay.end();
        overlay.set_color(PALETTE[1].1);
        overlay.begin(pos2(0.0, 0.0));
        overlay.extend(pos2(1.0, 1.0));
        overlay.end();

        let colors: Vec<Color32> = overlay.strokes().map(|s| s.color).collect();
        assert_eq!(colors, vec![PALETTE[0].1, PALETTE[1].1]);
    }

    #[test]
    fn test_close_keeps_strokes_and_ends_open_stroke() {
        let mut overlay = open_overlay();
        overlay.begin(pos2(0.0, 0.0));
        overlay.extend(pos2(9.0, 9.0));
        overlay.close();
        assert!(!overlay.is_active());
        assert!(overlay.current.is_none());
        assert_eq!(overlay.strokes().count(), 1);
        overlay.open();
        assert_eq!(overlay.strokes().count(), 1);
    }

    #[test]
    fn test_resize_retains_strokes() {
        let mut overlay = open_overlay();
        assert!(overlay.resize(Vec2::new(800.0, 600.0)));
        overlay.begin(pos2(0.0, 0.0));
        overlay.extend(pos2(700.0, 500.0));
        overlay.end();
        assert!(overlay.resize(Vec2::new(400.0, 300.0)));
        assert!(!overlay.resize(Vec2::new(400.0, 300.0)));
        assert_eq!(overlay.strokes().count(), 1);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#bfa032"),
            Some(Color32::from_rgb(0xBF, 0xA0, 0x32))
        );
        assert_eq!(parse_hex_color("bfa032"), None);
        assert_eq!(parse_hex_color("#bfa03"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
