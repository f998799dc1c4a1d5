//! Viewport state for the scrolled grid window.

use crate::block::Block;

use super::SheetLayout;

/// Visible area of the grid window, in grid pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Horizontal scroll position in grid coordinates
    pub scroll_x: i32,
    /// Vertical scroll position in grid coordinates
    pub scroll_y: i32,
    /// Grid window width in pixels
    pub width: i32,
    /// Grid window height in pixels
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
            width,
            height,
        }
    }

    /// Block of grid cells at least partly visible; empty for an empty grid.
    pub fn visible_block(&self, layout: &SheetLayout) -> Block {
        if self.width <= 0 || self.height <= 0 {
            return Block::default();
        }
        let rows = (
            layout.row_at_y(self.scroll_y, true),
            layout.row_at_y(self.scroll_y + self.height - 1, true),
        );
        let cols = (
            layout.col_at_x(self.scroll_x, true),
            layout.col_at_x(self.scroll_x + self.width - 1, true),
        );
        match (rows, cols) {
            ((Some(top), Some(bottom)), (Some(left), Some(right))) => {
                let mut block = Block::default();
                block.set_corners(top, left, bottom, right);
                block
            }
            _ => Block::default(),
        }
    }

    /// Convert grid coordinates to window coordinates
    pub fn to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.scroll_x, y - self.scroll_y)
    }

    /// Convert window coordinates to grid coordinates
    pub fn to_sheet(&self, screen_x: i32, screen_y: i32) -> (i32, i32) {
        (screen_x + self.scroll_x, screen_y + self.scroll_y)
    }

    /// Clamp scroll position so the last row/column can be reached but not
    /// scrolled past.
    pub fn clamp_scroll(&mut self, layout: &SheetLayout) {
        let max_x = (layout.total_width() - self.width).max(0);
        let max_y = (layout.total_height() - self.height).max(0);
        self.scroll_x = self.scroll_x.clamp(0, max_x);
        self.scroll_y = self.scroll_y.clamp(0, max_y);
    }

    /// Scroll by delta amounts
    pub fn scroll_by(&mut self, delta_x: i32, delta_y: i32, layout: &SheetLayout) {
        self.scroll_x += delta_x;
        self.scroll_y += delta_y;
        self.clamp_scroll(layout);
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, x: i32, y: i32, layout: &SheetLayout) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll(layout);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::layout::ArrayEdge;

    fn layout(rows: i32, cols: i32) -> SheetLayout {
        SheetLayout::new(ArrayEdge::new(rows, 20, 5), ArrayEdge::new(cols, 50, 5), 0, 0)
    }

    #[test]
    fn test_visible_block_at_origin() {
        let vp = Viewport::new(120, 50);
        assert_eq!(vp.visible_block(&layout(100, 100)), Block::new(0, 0, 3, 3));
    }

    #[test]
    fn test_visible_block_after_scroll() {
        let layout = layout(100, 100);
        let mut vp = Viewport::new(100, 40);
        vp.scroll_by(75, 30, &layout);
        // cols 1..=3 (x 75..174), rows 1..=3 (y 30..69)
        assert_eq!(vp.visible_block(&layout), Block::new(1, 1, 3, 3));
    }

    #[test]
    fn test_visible_block_clipped_to_small_grid() {
        let vp = Viewport::new(800, 600);
        assert_eq!(vp.visible_block(&layout(2, 3)), Block::new(0, 0, 2, 3));
        assert!(vp.visible_block(&layout(0, 3)).is_empty());
    }

    #[test]
    fn test_clamp_scroll() {
        let layout = layout(10, 10); // 200 x 500 px
        let mut vp = Viewport::new(100, 100);
        vp.set_scroll(1000, -5, &layout);
        assert_eq!((vp.scroll_x, vp.scroll_y), (400, 0));
        vp.set_scroll(10, 500, &layout);
        assert_eq!((vp.scroll_x, vp.scroll_y), (10, 100));
    }

    #[test]
    fn test_screen_round_trip() {
        let layout = layout(100, 100);
        let mut vp = Viewport::new(100, 100);
        vp.set_scroll(40, 60, &layout);
        assert_eq!(vp.to_screen(50, 70), (10, 10));
        assert_eq!(vp.to_sheet(10, 10), (50, 70));
    }
}
