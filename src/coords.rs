//! Cell addressing.
//!
//! A [`Coords`] addresses one cell of the sheet. Rows and columns `>= 0` are
//! grid cells; `-1` in either position addresses a label cell:
//!
//! | row  | col  | cell                         |
//! |------|------|------------------------------|
//! | >= 0 | >= 0 | grid cell                    |
//! | >= 0 | -1   | row label for `row`          |
//! | -1   | >= 0 | column label for `col`       |
//! | -1   | -1   | the corner label             |

use std::fmt;
use std::ops::{Add, Sub};

/// (row, col) address, ordered by row then col.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coords {
    pub row: i32,
    pub col: i32,
}

/// Geometric category of a [`Coords`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCategory {
    Grid,
    RowLabel,
    ColLabel,
    Corner,
    /// Anything below -1, never a drawable cell.
    Unknown,
}

impl Coords {
    /// The corner label cell.
    pub const CORNER: Self = Self { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Row label cell for `row`.
    pub const fn row_label(row: i32) -> Self {
        Self { row, col: -1 }
    }

    /// Column label cell for `col`.
    pub const fn col_label(col: i32) -> Self {
        Self { row: -1, col }
    }

    pub fn category(self) -> CellCategory {
        match (self.row, self.col) {
            (r, c) if r >= 0 && c >= 0 => CellCategory::Grid,
            (r, -1) if r >= 0 => CellCategory::RowLabel,
            (-1, c) if c >= 0 => CellCategory::ColLabel,
            (-1, -1) => CellCategory::Corner,
            _ => CellCategory::Unknown,
        }
    }

    pub fn is_grid_cell(self) -> bool {
        self.category() == CellCategory::Grid
    }

    pub fn is_row_label(self) -> bool {
        self.category() == CellCategory::RowLabel
    }

    pub fn is_col_label(self) -> bool {
        self.category() == CellCategory::ColLabel
    }

    pub fn is_corner(self) -> bool {
        self.category() == CellCategory::Corner
    }

    /// True for any of the three label categories.
    pub fn is_label(self) -> bool {
        matches!(
            self.category(),
            CellCategory::RowLabel | CellCategory::ColLabel | CellCategory::Corner
        )
    }

    /// Copy offset by the given number of rows and columns.
    #[must_use]
    pub const fn shifted(self, rows: i32, cols: i32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }
}

impl Add for Coords {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Coords {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl From<(i32, i32)> for Coords {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
