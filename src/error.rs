//! Structured error types for sheetgrid.
//!
//! Precondition failures (bad coordinates, illegal attr kinds, cyclic
//! default-attr chains) are reported through [`SheetError`]. A vetoed
//! user-facing event is not an error: those operations return `Ok(false)`.

use crate::attr::AttrKind;
use crate::coords::Coords;

/// All errors that can occur while manipulating the sheet model.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Coordinates outside the table, or of the wrong category for the call.
    #[error("Invalid coordinates: {0}")]
    InvalidCoords(Coords),

    /// Row or column index outside the valid range.
    #[error("Invalid index {index} (count {count})")]
    InvalidIndex { index: i32, count: i32 },

    /// An attr kind that is not legal for the coordinate's category.
    #[error("Attr kind {kind:?} is not valid for {coords}")]
    InvalidAttrKind { kind: AttrKind, coords: Coords },

    /// Installing the default attr would make the chain loop back on itself.
    #[error("Setting this default attr would create a cyclic chain")]
    CyclicDefaultAttr,

    /// A `CellAttr` handle was used before `create()`.
    #[error("Cell attr is not initialized")]
    UninitializedAttr,

    /// A renderer or editor parameter string could not be parsed.
    #[error("Invalid parameter string: {0}")]
    InvalidParameter(String),

    /// Configuration file could not be parsed.
    #[error("Config: {0}")]
    Config(#[from] toml::de::Error),

    /// Clipboard text could not be read or written as tab-separated values.
    #[error("Clipboard text: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetError>;

impl From<String> for SheetError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SheetError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
