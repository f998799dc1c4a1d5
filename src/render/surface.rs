//! Drawing surface abstraction.
//!
//! The sheet never talks to a windowing toolkit directly: everything is drawn
//! through [`Surface`]. [`RecordingSurface`] keeps the issued operations in a
//! list, which is what headless callers and tests use.

use crate::attr::Font;
use crate::color::Colour;
use crate::layout::Rect;

/// Opaque drawing target, in window pixel coordinates.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, colour: Colour);

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Colour);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: i32, y: i32, font: &Font, colour: Colour);

    fn draw_check(&mut self, rect: Rect, checked: bool, colour: Colour);

    /// Marker shown at the right edge of a cell whose text was clipped.
    fn draw_overflow_marker(&mut self, rect: Rect, colour: Colour);

    /// Width and height of `text` in `font`.
    fn text_extent(&self, text: &str, font: &Font) -> (i32, i32);

    /// Restrict drawing to `rect`, or lift the restriction with `None`.
    fn set_clip(&mut self, _rect: Option<Rect>) {}
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, colour: Colour },
    Line { x1: i32, y1: i32, x2: i32, y2: i32, colour: Colour },
    Text { text: String, x: i32, y: i32, colour: Colour },
    Check { rect: Rect, checked: bool },
    OverflowMarker { rect: Rect },
    Clip(Option<Rect>),
}

/// Surface that records every call and measures text with a fixed-pitch
/// approximation of the font.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Text strings drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        self.ops.push(DrawOp::FillRect { rect, colour });
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Colour) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            colour,
        });
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, _font: &Font, colour: Colour) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            colour,
        });
    }

    fn draw_check(&mut self, rect: Rect, checked: bool, _colour: Colour) {
        self.ops.push(DrawOp::Check { rect, checked });
    }

    fn draw_overflow_marker(&mut self, rect: Rect, _colour: Colour) {
        self.ops.push(DrawOp::OverflowMarker { rect });
    }

    // Each char is 0.6 em wide, lines are 1.2 em tall.
    fn text_extent(&self, text: &str, font: &Font) -> (i32, i32) {
        let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        let char_width = (font.point_size * 6 / 10).max(1);
        (chars.saturating_mul(char_width), font.point_size * 12 / 10)
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.ops.push(DrawOp::Clip(rect));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut surface = RecordingSurface::new();
        let font = Font::default();
        surface.fill_rect(Rect::new(0, 0, 10, 10), Colour::WHITE);
        surface.draw_text("abc", 2, 3, &font, Colour::BLACK);
        assert_eq!(surface.ops().len(), 2);
        assert_eq!(surface.texts(), vec!["abc"]);
        surface.clear();
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_text_extent() {
        let surface = RecordingSurface::new();
        let font = Font::new("Mono", 10);
        assert_eq!(surface.text_extent("abcd", &font), (24, 12));
        assert_eq!(surface.text_extent("", &font), (0, 12));
    }
}
