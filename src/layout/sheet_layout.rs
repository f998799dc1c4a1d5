//! Row/column geometry for a sheet.
//!
//! Each of the four windows (grid, row labels, column labels, corner) has its
//! own pixel space starting at (0, 0). Grid cells are positioned by both edge
//! arrays, row labels only vertically, column labels only horizontally.

use crate::block::Block;
use crate::coords::{CellCategory, Coords};

use super::ArrayEdge;

/// Pixel rectangle; `width`/`height` of 0 means nothing is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Shrink by `dx` on the left and right and `dy` on top and bottom.
    #[must_use]
    pub fn deflate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + dy,
            (self.width - 2 * dx).max(0),
            (self.height - 2 * dy).max(0),
        )
    }
}

/// Row heights, column widths and label window sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub rows: ArrayEdge,
    pub cols: ArrayEdge,
    /// Width of the row label window (0 hides it).
    pub row_label_width: i32,
    /// Height of the column label window (0 hides it).
    pub col_label_height: i32,
}

impl SheetLayout {
    pub fn new(rows: ArrayEdge, cols: ArrayEdge, row_label_width: i32, col_label_height: i32) -> Self {
        Self {
            rows,
            cols,
            row_label_width,
            col_label_height,
        }
    }

    pub fn number_rows(&self) -> i32 {
        self.rows.count()
    }

    pub fn number_cols(&self) -> i32 {
        self.cols.count()
    }

    /// True if `coords` names an existing grid or label cell.
    pub fn contains_coords(&self, coords: Coords) -> bool {
        let row_ok = coords.row >= 0 && coords.row < self.rows.count();
        let col_ok = coords.col >= 0 && coords.col < self.cols.count();
        match coords.category() {
            CellCategory::Grid => row_ok && col_ok,
            CellCategory::RowLabel => row_ok,
            CellCategory::ColLabel => col_ok,
            CellCategory::Corner => true,
            CellCategory::Unknown => false,
        }
    }

    /// Bounds of a cell in its own window's pixel space.
    pub fn cell_rect(&self, coords: Coords) -> Option<Rect> {
        if !self.contains_coords(coords) {
            return None;
        }
        let (x, width) = if coords.col >= 0 {
            (self.cols.get_min(coords.col), self.cols.get_size(coords.col))
        } else {
            (0, self.row_label_width)
        };
        let (y, height) = if coords.row >= 0 {
            (self.rows.get_min(coords.row), self.rows.get_size(coords.row))
        } else {
            (0, self.col_label_height)
        };
        Some(Rect::new(x, y, width, height))
    }

    /// Bounds of a block of grid cells, clipped to the grid.
    pub fn block_rect(&self, block: &Block) -> Option<Rect> {
        let grid = Block::new(0, 0, self.rows.count(), self.cols.count());
        let block = block.intersect(&grid);
        if block.is_empty() {
            return None;
        }
        let x = self.cols.get_min(block.left());
        let y = self.rows.get_min(block.top());
        let right = self.cols.get_max(block.right());
        let bottom = self.rows.get_max(block.bottom());
        Some(Rect::new(x, y, right - x + 1, bottom - y + 1))
    }

    /// Find row at y position (binary search)
    pub fn row_at_y(&self, y: i32, clip: bool) -> Option<i32> {
        self.rows.find_index(y, clip)
    }

    /// Find column at x position (binary search)
    pub fn col_at_x(&self, x: i32, clip: bool) -> Option<i32> {
        self.cols.find_index(x, clip)
    }

    /// Grid cell under a grid-window pixel.
    pub fn xy_to_cell(&self, x: i32, y: i32, clip: bool) -> Option<Coords> {
        let row = self.row_at_y(y, clip)?;
        let col = self.col_at_x(x, clip)?;
        Some(Coords::new(row, col))
    }

    /// Row whose bottom edge is within `edge_size` pixels of `y`.
    pub fn row_edge_at(&self, y: i32, edge_size: i32) -> Option<i32> {
        self.rows.find_max_edge_index(y, edge_size)
    }

    /// Column whose right edge is within `edge_size` pixels of `x`.
    pub fn col_edge_at(&self, x: i32, edge_size: i32) -> Option<i32> {
        self.cols.find_max_edge_index(x, edge_size)
    }

    /// Get total width of the grid
    pub fn total_width(&self) -> i32 {
        self.cols.total()
    }

    /// Get total height of the grid
    pub fn total_height(&self) -> i32 {
        self.rows.total()
    }

    /// Get column width at index
    pub fn col_width(&self, col: i32) -> i32 {
        self.cols.get_size(col)
    }

    /// Get row height at index
    pub fn row_height(&self, row: i32) -> i32 {
        self.rows.get_size(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn layout() -> SheetLayout {
        SheetLayout::new(ArrayEdge::new(10, 20, 5), ArrayEdge::new(5, 64, 5), 40, 24)
    }

    #[test]
    fn test_basic_layout() {
        let layout = layout();
        assert_eq!(layout.total_width(), 64 * 5);
        assert_eq!(layout.total_height(), 20 * 10);
        assert_eq!(layout.row_label_width, 40);
        assert_eq!(layout.col_label_height, 24);
        assert_eq!(
            layout.cell_rect(Coords::row_label(1)),
            Some(Rect::new(0, 20, 40, 20))
        );
    }

    #[test]
    fn test_cell_rect() {
        let layout = layout();
        assert_eq!(layout.cell_rect(Coords::new(0, 0)), Some(Rect::new(0, 0, 64, 20)));
        assert_eq!(layout.cell_rect(Coords::new(1, 2)), Some(Rect::new(128, 20, 64, 20)));
        assert_eq!(layout.cell_rect(Coords::row_label(3)), Some(Rect::new(0, 60, 40, 20)));
        assert_eq!(layout.cell_rect(Coords::col_label(1)), Some(Rect::new(64, 0, 64, 24)));
        assert_eq!(layout.cell_rect(Coords::CORNER), Some(Rect::new(0, 0, 40, 24)));
        assert_eq!(layout.cell_rect(Coords::new(10, 0)), None);
    }

    #[test]
    fn test_block_rect_clips_to_grid() {
        let layout = layout();
        assert_eq!(
            layout.block_rect(&Block::new(1, 1, 2, 2)),
            Some(Rect::new(64, 20, 128, 40))
        );
        assert_eq!(
            layout.block_rect(&Block::new(8, 3, 10, 10)),
            Some(Rect::new(192, 160, 128, 40))
        );
        assert_eq!(layout.block_rect(&Block::new(20, 20, 1, 1)), None);
    }

    #[test]
    fn test_xy_to_cell() {
        let layout = layout();
        assert_eq!(layout.xy_to_cell(0, 0, false), Some(Coords::new(0, 0)));
        assert_eq!(layout.xy_to_cell(65, 41, false), Some(Coords::new(2, 1)));
        assert_eq!(layout.xy_to_cell(1000, 10, false), None);
        assert_eq!(layout.xy_to_cell(1000, 10, true), Some(Coords::new(0, 4)));
    }

    #[test]
    fn test_edges_near_resize_handles() {
        let layout = layout();
        assert_eq!(layout.row_edge_at(41, 2), Some(1));
        assert_eq!(layout.col_edge_at(129, 2), Some(1));
        assert_eq!(layout.col_edge_at(100, 2), None);
    }

    #[test]
    fn test_rect_helpers() {
        let r = Rect::new(10, 10, 20, 10);
        assert_eq!(r.right(), 29);
        assert!(r.contains(29, 19));
        assert!(!r.contains(30, 19));
        assert_eq!(r.deflate(2, 1), Rect::new(12, 11, 16, 8));
        assert!(Rect::new(0, 0, 0, 5).is_empty());
    }
}
