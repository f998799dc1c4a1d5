//! Sparse attr storage for cells, rows, columns and labels.

use tracing::trace;

use crate::coords::{CellCategory, Coords};
use crate::error::{Result, SheetError};
use crate::pair_array::PairArray;

use super::cell_attr::CellAttr;
use super::types::{AttrKind, AttrLevel};

/// Per-cell, per-row and per-column attrs, plus label attrs.
///
/// Lookups with [`AttrKind::Any`] merge every attr that applies to a grid
/// cell into a transient chain ordered by [`AttrLevel`].
#[derive(Debug, Clone, Default)]
pub struct CellAttrProvider {
    cell_attrs: PairArray<Coords, CellAttr>,
    row_attrs: PairArray<i32, CellAttr>,
    col_attrs: PairArray<i32, CellAttr>,
    row_label_attrs: PairArray<i32, CellAttr>,
    col_label_attrs: PairArray<i32, CellAttr>,
    corner_attr: CellAttr,
}

// Tie-break among equal levels: columns are the outermost fallback, cells
// win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    Col,
    Row,
    Cell,
}

impl CellAttrProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attr stored for `coords`, or an uncreated attr if there is none.
    ///
    /// Grid cells accept `Cell`, `Row`, `Col` and `Any`. Label and corner
    /// cells have a single store and accept `Cell` or `Any`.
    pub fn get_attr(&self, coords: Coords, kind: AttrKind) -> Result<CellAttr> {
        let found = match (coords.category(), kind) {
            (CellCategory::Grid, AttrKind::Cell) => self.cell_attrs.get(coords).cloned(),
            (CellCategory::Grid, AttrKind::Row) => self.row_attrs.get(coords.row).cloned(),
            (CellCategory::Grid, AttrKind::Col) => self.col_attrs.get(coords.col).cloned(),
            (CellCategory::Grid, AttrKind::Any) => return self.merged_attr(coords),
            (CellCategory::RowLabel, AttrKind::Cell | AttrKind::Any) => {
                self.row_label_attrs.get(coords.row).cloned()
            }
            (CellCategory::ColLabel, AttrKind::Cell | AttrKind::Any) => {
                self.col_label_attrs.get(coords.col).cloned()
            }
            (CellCategory::Corner, AttrKind::Cell | AttrKind::Any) => Some(self.corner_attr.clone()),
            (CellCategory::Unknown, _) => return Err(SheetError::InvalidCoords(coords)),
            (_, kind) => return Err(SheetError::InvalidAttrKind { kind, coords }),
        };
        Ok(found.unwrap_or_default())
    }

    /// Store `attr` for `coords`; an uncreated attr removes the entry.
    ///
    /// The attr's kind is set to `kind`. Merged (`Any`) attrs cannot be
    /// stored for grid cells.
    pub fn set_attr(&mut self, coords: Coords, attr: CellAttr, kind: AttrKind) -> Result<()> {
        match (coords.category(), kind) {
            (CellCategory::Grid, AttrKind::Cell) => {
                set_or_remove(&mut self.cell_attrs, coords, attr, kind);
            }
            (CellCategory::Grid, AttrKind::Row) => {
                set_or_remove(&mut self.row_attrs, coords.row, attr, kind);
            }
            (CellCategory::Grid, AttrKind::Col) => {
                set_or_remove(&mut self.col_attrs, coords.col, attr, kind);
            }
            (CellCategory::RowLabel, AttrKind::Cell | AttrKind::Any) => {
                set_or_remove(&mut self.row_label_attrs, coords.row, attr, AttrKind::Cell);
            }
            (CellCategory::ColLabel, AttrKind::Cell | AttrKind::Any) => {
                set_or_remove(&mut self.col_label_attrs, coords.col, attr, AttrKind::Cell);
            }
            (CellCategory::Corner, AttrKind::Cell | AttrKind::Any) => {
                if attr.is_ok() {
                    attr.set_kind(AttrKind::Cell);
                }
                self.corner_attr = attr;
            }
            (CellCategory::Unknown, _) => return Err(SheetError::InvalidCoords(coords)),
            (_, kind) => return Err(SheetError::InvalidAttrKind { kind, coords }),
        }
        Ok(())
    }

    /// Number of stored attrs, labels and corner included.
    pub fn len(&self) -> usize {
        self.cell_attrs.len()
            + self.row_attrs.len()
            + self.col_attrs.len()
            + self.row_label_attrs.len()
            + self.col_label_attrs.len()
            + usize::from(self.corner_attr.is_ok())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Shift for `num` rows inserted (`> 0`) or deleted (`< 0`) at `pos`.
    pub fn update_rows(&mut self, pos: i32, num: i32) -> bool {
        let mut changed = self.cell_attrs.update_rows(pos, num);
        changed |= self.row_attrs.update_pos(pos, num);
        changed |= self.row_label_attrs.update_pos(pos, num);
        if changed {
            trace!(target: "sheet::attr", pos, num, "shifted row attrs");
        }
        changed
    }

    /// Column counterpart of [`CellAttrProvider::update_rows`].
    pub fn update_cols(&mut self, pos: i32, num: i32) -> bool {
        let mut changed = self.cell_attrs.update_cols(pos, num);
        changed |= self.col_attrs.update_pos(pos, num);
        changed |= self.col_label_attrs.update_pos(pos, num);
        if changed {
            trace!(target: "sheet::attr", pos, num, "shifted col attrs");
        }
        changed
    }

    // Zero matches: uncreated. One: the stored attr itself. More: a chain of
    // fresh layers, highest priority first, tagged `Any`.
    fn merged_attr(&self, coords: Coords) -> Result<CellAttr> {
        let mut found: Vec<(AttrLevel, Source, &CellAttr)> = Vec::with_capacity(3);
        for (source, attr) in [
            (Source::Col, self.col_attrs.get(coords.col)),
            (Source::Row, self.row_attrs.get(coords.row)),
            (Source::Cell, self.cell_attrs.get(coords)),
        ] {
            if let Some(attr) = attr.filter(|a| a.is_ok()) {
                found.push((attr.level(), source, attr));
            }
        }

        match found.as_slice() {
            [] => return Ok(CellAttr::null()),
            [(_, _, only)] => return Ok((*only).clone()),
            _ => {}
        }

        found.sort_by_key(|(level, source, _)| (*level, *source));
        let mut chain = CellAttr::null();
        for (_, _, attr) in found {
            let layer = attr.shallow_copy();
            if chain.is_ok() {
                layer.set_default_attr(&chain)?;
            }
            chain = layer;
        }
        chain.set_kind(AttrKind::Any);
        Ok(chain)
    }
}

fn set_or_remove<K: Ord + Copy>(
    store: &mut PairArray<K, CellAttr>,
    key: K,
    attr: CellAttr,
    kind: AttrKind,
) {
    if attr.is_ok() {
        attr.set_kind(kind);
        store.set_value(key, attr);
    } else {
        store.remove_value(key);
    }
}
