//! Layout engine mapping rows and columns to pixels.
//!
//! This module handles:
//! - Cumulative row heights / column widths with lazy materialization
//! - Binary search for the cell under a pixel
//! - Label window geometry (row labels, column labels, corner)
//! - Viewport state (scroll position, visible block)

mod edge;
mod sheet_layout;
mod viewport;

pub use edge::ArrayEdge;
pub use sheet_layout::{Rect, SheetLayout};
pub use viewport::Viewport;
