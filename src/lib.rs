//! sheetgrid - spreadsheet grid model
//!
//! The in-memory core of a grid control that shows a table too large to
//! turn into widgets. Every visible cell is drawn on demand from a value and
//! an attr pulled from the model:
//! - Cell addressing with label cells (`-1` rows/cols) and block algebra
//! - Row/column pixel edges with lazy materialization and binary search
//! - Sorted sparse key/value storage that shifts on row/col insert/delete
//! - Multi-block selection with minimization
//! - Layered, chainable cell attrs resolved by priority level
//! - Renderer and editor contracts with string/number/float/bool/choice
//!   implementations
//!
//! # Usage
//!
//! ```
//! use sheetgrid::{Block, Coords, Sheet, StringTable};
//!
//! let mut sheet = Sheet::new(StringTable::new(100, 26));
//! sheet.set_cell_value(Coords::new(0, 0), "hello").unwrap();
//! sheet.select_block(Block::new(0, 0, 2, 2));
//! assert!(sheet.is_cell_selected(Coords::new(1, 1)));
//! ```

// Model
pub mod attr;
pub mod block;
pub mod cell_ref;
pub mod coords;
pub mod pair_array;
pub mod selection;
pub mod table;

// Sheet windows
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod events;
pub mod layout;
pub mod render;
pub mod sheet;

pub mod color;
pub mod error;

pub use attr::{AttrKind, AttrLevel, CellAttr, CellAttrProvider};
pub use block::Block;
pub use clipboard::CopiedCells;
pub use color::Colour;
pub use config::SheetConfig;
pub use coords::{CellCategory, Coords};
pub use error::{Result, SheetError};
pub use events::{EventResponse, SheetEvent, SheetEventHandler};
pub use layout::{ArrayEdge, Rect, SheetLayout, Viewport};
pub use pair_array::PairArray;
pub use selection::{Selection, SelectionMode, SelectionPolicy};
pub use sheet::{Sheet, SheetRefData};
pub use table::{SheetTable, StringTable, ValueType};
