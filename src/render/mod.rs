//! Drawing: the surface abstraction, shared resources and cell renderers.
//!
//! This module provides:
//! - [`Surface`], the opaque drawing target, and [`RecordingSurface`]
//! - [`SheetResources`], created once and shared by every sheet window
//! - [`CellRenderer`] with string, number, float and bool implementations

mod renderers;
mod resources;
mod surface;

pub use renderers::{
    draw_background, draw_text_in_cell, BoolRenderer, CellDraw, CellRenderer, FloatRenderer,
    NumberRenderer, StringRenderer,
};
pub(crate) use renderers::parse_pair;
pub use resources::SheetResources;
pub use surface::{DrawOp, RecordingSurface, Surface};
