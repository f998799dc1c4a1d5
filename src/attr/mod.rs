//! Cell attributes and their sparse, layered storage.

mod cell_attr;
mod provider;
mod types;

pub use cell_attr::{share_editor, share_renderer, CellAttr, SharedEditor, SharedRenderer};
pub use provider::CellAttrProvider;
pub use types::{Alignment, AttrKind, AttrLevel, Font, HAlign, Orientation, VAlign};
