//! Cell value source.
//!
//! [`SheetTable`] is everything the sheet needs from its data: counts,
//! string values for grid and label cells, typed accessors and row/column
//! insertion. [`StringTable`] is a sparse in-memory implementation.

use tracing::debug;

use crate::cell_ref::{col_letters, row_number};
use crate::coords::{CellCategory, Coords};
use crate::error::{Result, SheetError};
use crate::pair_array::PairArray;

/// Value interpretations a table can be probed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Long,
    Double,
    Bool,
}

/// Parse the usual spellings of a boolean cell value.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "x" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Data source for a sheet.
pub trait SheetTable {
    fn number_rows(&self) -> i32;

    fn number_cols(&self) -> i32;

    /// String value of a grid, label or corner cell; empty if unset.
    fn value(&self, coords: Coords) -> String;

    fn set_value(&mut self, coords: Coords, value: &str) -> Result<()>;

    fn has_value(&self, coords: Coords) -> bool {
        !self.value(coords).is_empty()
    }

    fn value_as_long(&self, coords: Coords) -> Option<i64> {
        self.value(coords).trim().parse().ok()
    }

    fn value_as_double(&self, coords: Coords) -> Option<f64> {
        self.value(coords).trim().parse().ok()
    }

    fn value_as_bool(&self, coords: Coords) -> Option<bool> {
        parse_bool(&self.value(coords))
    }

    fn can_get_value_as(&self, coords: Coords, value_type: ValueType) -> bool {
        match value_type {
            ValueType::String => true,
            ValueType::Long => self.value_as_long(coords).is_some(),
            ValueType::Double => self.value_as_double(coords).is_some(),
            ValueType::Bool => self.value_as_bool(coords).is_some(),
        }
    }

    fn insert_rows(&mut self, pos: i32, num: i32) -> Result<()>;

    fn delete_rows(&mut self, pos: i32, num: i32) -> Result<()>;

    fn insert_cols(&mut self, pos: i32, num: i32) -> Result<()>;

    fn delete_cols(&mut self, pos: i32, num: i32) -> Result<()>;

    fn append_rows(&mut self, num: i32) -> Result<()> {
        let rows = self.number_rows();
        self.insert_rows(rows, num)
    }

    fn append_cols(&mut self, num: i32) -> Result<()> {
        let cols = self.number_cols();
        self.insert_cols(cols, num)
    }
}

/// Sparse string grid with optional custom labels.
///
/// Unset labels fall back to `1, 2, 3, …` for rows and `A, B, …, AA, …` for
/// columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTable {
    rows: i32,
    cols: i32,
    values: PairArray<Coords, String>,
    row_labels: PairArray<i32, String>,
    col_labels: PairArray<i32, String>,
    corner_label: String,
}

impl StringTable {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows: rows.max(0),
            cols: cols.max(0),
            ..Self::default()
        }
    }

    /// Number of non-empty grid cells.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Non-empty grid cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coords, &str)> + '_ {
        self.values.iter().map(|(c, v)| (c, v.as_str()))
    }

    pub fn clear_values(&mut self) {
        self.values.clear();
    }

    fn in_range(&self, coords: Coords) -> bool {
        let row_ok = coords.row >= 0 && coords.row < self.rows;
        let col_ok = coords.col >= 0 && coords.col < self.cols;
        match coords.category() {
            CellCategory::Grid => row_ok && col_ok,
            CellCategory::RowLabel => row_ok,
            CellCategory::ColLabel => col_ok,
            CellCategory::Corner => true,
            CellCategory::Unknown => false,
        }
    }

    fn check_insert(pos: i32, num: i32, count: i32) -> Result<()> {
        if pos < 0 || pos > count || num < 0 {
            return Err(SheetError::InvalidIndex { index: pos, count });
        }
        Ok(())
    }

    fn check_delete(pos: i32, num: i32, count: i32) -> Result<()> {
        if pos < 0 || num < 0 || pos + num > count {
            return Err(SheetError::InvalidIndex { index: pos + num - 1, count });
        }
        Ok(())
    }
}

impl SheetTable for StringTable {
    fn number_rows(&self) -> i32 {
        self.rows
    }

    fn number_cols(&self) -> i32 {
        self.cols
    }

    fn value(&self, coords: Coords) -> String {
        if !self.in_range(coords) {
            debug!(target: "sheet::table", %coords, "value requested outside the table");
            return String::new();
        }
        match coords.category() {
            CellCategory::Grid => self.values.get(coords).cloned().unwrap_or_default(),
            CellCategory::RowLabel => self
                .row_labels
                .get(coords.row)
                .cloned()
                .unwrap_or_else(|| row_number(coords.row)),
            CellCategory::ColLabel => self
                .col_labels
                .get(coords.col)
                .cloned()
                .unwrap_or_else(|| col_letters(coords.col)),
            CellCategory::Corner => self.corner_label.clone(),
            CellCategory::Unknown => String::new(),
        }
    }

    /// An empty value clears the cell (or restores a label's default).
    fn set_value(&mut self, coords: Coords, value: &str) -> Result<()> {
        if !self.in_range(coords) {
            return Err(SheetError::InvalidCoords(coords));
        }
        match coords.category() {
            CellCategory::Grid => set_or_clear(&mut self.values, coords, value),
            CellCategory::RowLabel => set_or_clear(&mut self.row_labels, coords.row, value),
            CellCategory::ColLabel => set_or_clear(&mut self.col_labels, coords.col, value),
            CellCategory::Corner => self.corner_label = value.to_string(),
            CellCategory::Unknown => return Err(SheetError::InvalidCoords(coords)),
        }
        Ok(())
    }

    fn insert_rows(&mut self, pos: i32, num: i32) -> Result<()> {
        Self::check_insert(pos, num, self.rows)?;
        self.values.update_rows(pos, num);
        self.row_labels.update_pos(pos, num);
        self.rows += num;
        Ok(())
    }

    fn delete_rows(&mut self, pos: i32, num: i32) -> Result<()> {
        Self::check_delete(pos, num, self.rows)?;
        self.values.update_rows(pos, -num);
        self.row_labels.update_pos(pos, -num);
        self.rows -= num;
        Ok(())
    }

    fn insert_cols(&mut self, pos: i32, num: i32) -> Result<()> {
        Self::check_insert(pos, num, self.cols)?;
        self.values.update_cols(pos, num);
        self.col_labels.update_pos(pos, num);
        self.cols += num;
        Ok(())
    }

    fn delete_cols(&mut self, pos: i32, num: i32) -> Result<()> {
        Self::check_delete(pos, num, self.cols)?;
        self.values.update_cols(pos, -num);
        self.col_labels.update_pos(pos, -num);
        self.cols -= num;
        Ok(())
    }
}

fn set_or_clear<K: Ord + Copy>(map: &mut PairArray<K, String>, key: K, value: &str) {
    if value.is_empty() {
        map.remove_value(key);
    } else {
        map.set_value(key, value.to_string());
    }
}
