//! Copied cell values and their tab-separated text form.
//!
//! [`CopiedCells`] holds values keyed by their offset from the top-left of
//! the copied area, so it can be pasted anywhere. The text form is TSV
//! read and written with the `csv` crate: tabs between columns, newlines
//! between rows, and values containing a tab, newline or quote wrapped in
//! quotes with inner quotes doubled.

use crate::coords::Coords;
use crate::error::{Result, SheetError};
use crate::pair_array::PairArray;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopiedCells {
    values: PairArray<Coords, String>,
    rows: i32,
    cols: i32,
}

impl CopiedCells {
    /// An empty area `rows` x `cols`.
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            values: PairArray::new(),
            rows: rows.max(0),
            cols: cols.max(0),
        }
    }

    /// Height and width of the copied area.
    pub fn size(&self) -> (i32, i32) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `offset` from the top-left; empty values are not stored.
    pub fn value(&self, offset: Coords) -> Option<&str> {
        self.values.get(offset).map(String::as_str)
    }

    /// Store `value` at `offset`, growing the area to cover it. Empty
    /// values clear the offset.
    pub fn set_value(&mut self, offset: Coords, value: impl Into<String>) {
        if !offset.is_grid_cell() {
            return;
        }
        let value = value.into();
        if value.is_empty() {
            self.values.remove_value(offset);
            return;
        }
        self.rows = self.rows.max(offset.row + 1);
        self.cols = self.cols.max(offset.col + 1);
        self.values.set_value(offset, value);
    }

    /// Stored values in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coords, &str)> + '_ {
        self.values.iter().map(|(c, v)| (c, v.as_str()))
    }

    /// TSV text, trimmed to the last row and column holding a value.
    pub fn to_text(&self) -> Result<String> {
        let (max_row, max_col) = self
            .values
            .keys()
            .iter()
            .fold((-1, -1), |(r, c), k| (r.max(k.row), c.max(k.col)));

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        for row in 0..=max_row {
            let record: Vec<&str> = (0..=max_col)
                .map(|col| self.value(Coords::new(row, col)).unwrap_or_default())
                .collect();
            writer.write_record(&record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| SheetError::Other(e.to_string()))?;
        let mut text = String::from_utf8(bytes).map_err(|e| SheetError::Other(e.to_string()))?;
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    /// Parse TSV text as written by [`CopiedCells::to_text`] or another
    /// spreadsheet. Rows may differ in length; `\r\n` line endings are
    /// accepted and blank lines are skipped.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut cells = CopiedCells::default();
        let mut row = 0;
        for result in reader.records() {
            let record = result?;
            let mut width = 0;
            for (col, field) in (0..).zip(record.iter()) {
                cells.set_value(Coords::new(row, col), field);
                width = col + 1;
            }
            cells.cols = cells.cols.max(width);
            row += 1;
        }
        cells.rows = cells.rows.max(row);
        Ok(cells)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("plain", "plain" ; "plain")]
    #[test_case("a\tb", "\"a\tb\"" ; "tab")]
    #[test_case("say \"hi\"", "\"say \"\"hi\"\"\"" ; "quotes")]
    #[test_case("two\nlines", "\"two\nlines\"" ; "newline")]
    fn test_single_value_quoting(input: &str, expected: &str) {
        let mut cells = CopiedCells::default();
        cells.set_value(Coords::new(0, 0), input);
        assert_eq!(cells.to_text().unwrap(), expected);
    }

    #[test]
    fn test_to_text_trims_to_content() {
        let mut cells = CopiedCells::new(3, 3);
        cells.set_value(Coords::new(0, 0), "a");
        cells.set_value(Coords::new(1, 1), "b");
        assert_eq!(cells.to_text().unwrap(), "a\t\n\tb");
        assert_eq!(cells.size(), (3, 3));
    }

    #[test]
    fn test_from_text() {
        let cells = CopiedCells::from_text("1\t2\r\n\"x\ty\"\t\n").unwrap();
        assert_eq!(cells.value(Coords::new(0, 0)), Some("1"));
        assert_eq!(cells.value(Coords::new(0, 1)), Some("2"));
        assert_eq!(cells.value(Coords::new(1, 0)), Some("x\ty"));
        assert_eq!(cells.value(Coords::new(1, 1)), None);
        assert_eq!(cells.size(), (2, 2));
    }

    #[test]
    fn test_ragged_rows() {
        let cells = CopiedCells::from_text("a\nb\tc\td\ne").unwrap();
        assert_eq!(cells.size(), (3, 3));
        assert_eq!(cells.value(Coords::new(1, 2)), Some("d"));
        assert_eq!(cells.value(Coords::new(2, 0)), Some("e"));
    }

    #[test]
    fn test_text_survives_reparse() {
        let mut cells = CopiedCells::new(2, 2);
        cells.set_value(Coords::new(0, 1), "say \"hi\"");
        cells.set_value(Coords::new(1, 0), "two\nlines");
        let parsed = CopiedCells::from_text(&cells.to_text().unwrap()).unwrap();
        assert_eq!(parsed.value(Coords::new(0, 1)), Some("say \"hi\""));
        assert_eq!(parsed.value(Coords::new(1, 0)), Some("two\nlines"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_empty_row_in_one_column_keeps_its_place() {
        let mut cells = CopiedCells::default();
        cells.set_value(Coords::new(0, 0), "top");
        cells.set_value(Coords::new(2, 0), "bottom");
        let parsed = CopiedCells::from_text(&cells.to_text().unwrap()).unwrap();
        assert_eq!(parsed.value(Coords::new(2, 0)), Some("bottom"));
        assert_eq!(parsed.size(), (3, 1));
    }

    #[test]
    fn test_empty_value_clears() {
        let mut cells = CopiedCells::default();
        cells.set_value(Coords::new(0, 0), "x");
        cells.set_value(Coords::new(0, 0), "");
        assert!(cells.is_empty());
        assert_eq!(cells.to_text().unwrap(), "");
        assert!(CopiedCells::from_text("").unwrap().is_empty());
    }
}
