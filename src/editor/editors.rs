use tracing::warn;

use crate::coords::Coords;
use crate::error::{Result, SheetError};
use crate::render::{parse_pair, CellRenderer, FloatRenderer};
use crate::table::{parse_bool, SheetTable};

use super::{CellEditor, KeyCode, KeyEvent};

/// Text loaded at `begin_edit` and the text being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct EditBuffer {
    start: String,
    text: String,
}

impl EditBuffer {
    fn load(&mut self, value: String) {
        self.text.clone_from(&value);
        self.start = value;
    }

    fn reset(&mut self) {
        self.text.clone_from(&self.start);
    }

    fn is_modified(&self) -> bool {
        self.text != self.start
    }

    // Write `value` if it differs from what was loaded.
    fn commit(&mut self, coords: Coords, table: &mut dyn SheetTable, value: String) -> Result<bool> {
        if value == self.start {
            self.text = value;
            return Ok(false);
        }
        table.set_value(coords, &value)?;
        self.text.clone_from(&value);
        self.start = value;
        Ok(true)
    }
}

/// Free text, optionally limited to a number of chars (parameter string is
/// the limit; empty means none).
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    buffer: EditBuffer,
    max_chars: Option<usize>,
}

impl TextEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }
}

impl CellEditor for TextEditor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn begin_edit(&mut self, coords: Coords, table: &dyn SheetTable) {
        self.buffer.load(table.value(coords));
    }

    fn end_edit(&mut self, coords: Coords, table: &mut dyn SheetTable) -> Result<bool> {
        if !self.buffer.is_modified() {
            return Ok(false);
        }
        let value = self.buffer.text.clone();
        self.buffer.commit(coords, table, value)
    }

    fn reset_value(&mut self) {
        self.buffer.reset();
    }

    fn value(&self) -> String {
        self.buffer.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.buffer.text = match self.max_chars {
            Some(max) => value.chars().take(max).collect(),
            None => value.to_string(),
        };
    }

    fn set_parameters(&mut self, params: &str) -> Result<()> {
        let params = params.trim();
        if params.is_empty() {
            self.max_chars = None;
            return Ok(());
        }
        let max = params
            .parse()
            .map_err(|_| SheetError::InvalidParameter(params.to_string()))?;
        self.max_chars = Some(max);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn CellEditor> {
        Box::new(self.clone())
    }
}

/// Integers, optionally clamped to a `"min,max"` range.
#[derive(Debug, Clone, Default)]
pub struct NumberEditor {
    buffer: EditBuffer,
    min: Option<i64>,
    max: Option<i64>,
}

impl NumberEditor {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    pub fn range(&self) -> (Option<i64>, Option<i64>) {
        (self.min, self.max)
    }

    fn clamp(&self, value: i64) -> i64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

impl CellEditor for NumberEditor {
    fn name(&self) -> &'static str {
        "number"
    }

    fn begin_edit(&mut self, coords: Coords, table: &dyn SheetTable) {
        let loaded = table
            .value_as_long(coords)
            .map(|n| n.to_string())
            .unwrap_or_default();
        self.buffer.load(loaded);
    }

    fn end_edit(&mut self, coords: Coords, table: &mut dyn SheetTable) -> Result<bool> {
        let text = self.buffer.text.trim().to_string();
        if text.is_empty() {
            return self.buffer.commit(coords, table, text);
        }
        let Ok(parsed) = text.parse::<i64>() else {
            warn!(target: "sheet::events", %coords, text = %text, "rejected non-numeric edit");
            self.buffer.reset();
            return Ok(false);
        };
        let value = self.clamp(parsed).to_string();
        self.buffer.commit(coords, table, value)
    }

    fn reset_value(&mut self) {
        self.buffer.reset();
    }

    fn value(&self) -> String {
        self.buffer.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.buffer.text = value.to_string();
    }

    fn is_accepted_key(&self, key: &KeyEvent) -> bool {
        matches!(key.printable(), Some(c) if c.is_ascii_digit() || c == '-' || c == '+')
    }

    fn set_parameters(&mut self, params: &str) -> Result<()> {
        let (min, max) = parse_pair::<i64>(params)?;
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(SheetError::InvalidParameter(params.to_string()));
            }
        }
        self.min = min;
        self.max = max;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn CellEditor> {
        Box::new(self.clone())
    }
}

/// Floating point numbers, written back with the `"width,precision"`
/// formatting of [`FloatRenderer`].
#[derive(Debug, Clone, Default)]
pub struct FloatEditor {
    buffer: EditBuffer,
    format: FloatRenderer,
}

impl FloatEditor {
    pub fn new(width: Option<usize>, precision: Option<usize>) -> Self {
        Self {
            buffer: EditBuffer::default(),
            format: FloatRenderer::new(width, precision),
        }
    }
}

impl CellEditor for FloatEditor {
    fn name(&self) -> &'static str {
        "float"
    }

    fn begin_edit(&mut self, coords: Coords, table: &dyn SheetTable) {
        let loaded = table
            .value_as_double(coords)
            .map(|v| self.format.format(v).trim().to_string())
            .unwrap_or_default();
        self.buffer.load(loaded);
    }

    fn end_edit(&mut self, coords: Coords, table: &mut dyn SheetTable) -> Result<bool> {
        let text = self.buffer.text.trim().to_string();
        if text.is_empty() {
            return self.buffer.commit(coords, table, text);
        }
        let Ok(parsed) = text.parse::<f64>() else {
            warn!(target: "sheet::events", %coords, text = %text, "rejected non-numeric edit");
            self.buffer.reset();
            return Ok(false);
        };
        let value = self.format.format(parsed).trim().to_string();
        self.buffer.commit(coords, table, value)
    }

    fn reset_value(&mut self) {
        self.buffer.reset();
    }

    fn value(&self) -> String {
        self.buffer.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.buffer.text = value.to_string();
    }

    fn is_accepted_key(&self, key: &KeyEvent) -> bool {
        matches!(
            key.printable(),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
        )
    }

    fn set_parameters(&mut self, params: &str) -> Result<()> {
        CellRenderer::set_parameters(&mut self.format, params)
    }

    fn clone_box(&self) -> Box<dyn CellEditor> {
        Box::new(self.clone())
    }
}

/// Check box. Space toggles, `+` checks, `-` clears. Values are written as
/// `"1"` or `"0"`.
#[derive(Debug, Clone, Default)]
pub struct BoolEditor {
    start: bool,
    value: bool,
}

impl BoolEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) {
        self.value = !self.value;
    }

    pub fn is_checked(&self) -> bool {
        self.value
    }
}

impl CellEditor for BoolEditor {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn begin_edit(&mut self, coords: Coords, table: &dyn SheetTable) {
        self.start = table.value_as_bool(coords).unwrap_or(false);
        self.value = self.start;
    }

    fn end_edit(&mut self, coords: Coords, table: &mut dyn SheetTable) -> Result<bool> {
        if self.value == self.start {
            return Ok(false);
        }
        table.set_value(coords, if self.value { "1" } else { "0" })?;
        self.start = self.value;
        Ok(true)
    }

    fn reset_value(&mut self) {
        self.value = self.start;
    }

    fn value(&self) -> String {
        (if self.value { "1" } else { "0" }).to_string()
    }

    fn set_value(&mut self, value: &str) {
        if let Some(b) = parse_bool(value) {
            self.value = b;
        }
    }

    fn is_accepted_key(&self, key: &KeyEvent) -> bool {
        matches!(key.printable(), Some(' ' | '+' | '-'))
    }

    fn starting_key(&mut self, key: &KeyEvent) {
        self.handle_key(key);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.printable() {
            Some(' ') => self.toggle(),
            Some('+') => self.value = true,
            Some('-') => self.value = false,
            _ => return false,
        }
        true
    }

    fn clone_box(&self) -> Box<dyn CellEditor> {
        Box::new(self.clone())
    }
}

/// Pick from a list. The parameter string is the comma-separated choices.
/// Unless `allow_others` is set, values outside the list are rejected.
#[derive(Debug, Clone, Default)]
pub struct ChoiceEditor {
    buffer: EditBuffer,
    choices: Vec<String>,
    allow_others: bool,
}

impl ChoiceEditor {
    pub fn new<S: Into<String>>(choices: impl IntoIterator<Item = S>, allow_others: bool) -> Self {
        Self {
            buffer: EditBuffer::default(),
            choices: choices.into_iter().map(Into::into).collect(),
            allow_others,
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Select the choice at `index`; false if out of range.
    pub fn select(&mut self, index: usize) -> bool {
        match self.choices.get(index) {
            Some(choice) => {
                self.buffer.text.clone_from(choice);
                true
            }
            None => false,
        }
    }

    fn is_choice(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c == value)
    }

    // Next choice starting with `c`, after the current one.
    fn cycle_to(&mut self, c: char) -> bool {
        let lower = c.to_lowercase().to_string();
        let current = self.choices.iter().position(|ch| *ch == self.buffer.text);
        let n = self.choices.len();
        let start = current.map_or(0, |i| i + 1);
        let found = (0..n)
            .map(|k| (start + k) % n)
            .find(|&i| {
                self.choices
                    .get(i)
                    .is_some_and(|ch| ch.to_lowercase().starts_with(&lower))
            });
        match found {
            Some(i) => self.select(i),
            None => false,
        }
    }
}

impl CellEditor for ChoiceEditor {
    fn name(&self) -> &'static str {
        "choice"
    }

    fn begin_edit(&mut self, coords: Coords, table: &dyn SheetTable) {
        self.buffer.load(table.value(coords));
    }

    fn end_edit(&mut self, coords: Coords, table: &mut dyn SheetTable) -> Result<bool> {
        let value = self.buffer.text.clone();
        if !self.allow_others && !value.is_empty() && !self.is_choice(&value) {
            warn!(target: "sheet::events", %coords, value = %value, "rejected value outside the choice list");
            self.buffer.reset();
            return Ok(false);
        }
        self.buffer.commit(coords, table, value)
    }

    fn reset_value(&mut self) {
        self.buffer.reset();
    }

    fn value(&self) -> String {
        self.buffer.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.buffer.text = value.to_string();
    }

    fn starting_key(&mut self, key: &KeyEvent) {
        self.handle_key(key);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if self.allow_others {
            let mut text = self.value();
            match (key.code, key.printable()) {
                (KeyCode::Backspace, _) => {
                    text.pop();
                }
                (_, Some(c)) => text.push(c),
                _ => return false,
            }
            self.set_value(&text);
            return true;
        }
        match key.printable() {
            Some(c) => self.cycle_to(c),
            None => false,
        }
    }

    fn set_parameters(&mut self, params: &str) -> Result<()> {
        self.choices = params
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn CellEditor> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::table::StringTable;
    use test_case::test_case;

    fn table_with(value: &str) -> StringTable {
        let mut table = StringTable::new(2, 2);
        table.set_value(Coords::new(0, 0), value).unwrap();
        table
    }

    const CELL: Coords = Coords::new(0, 0);

    #[test]
    fn test_text_edit_round_trip() {
        let mut table = table_with("old");
        let mut editor = TextEditor::new();
        editor.begin_edit(CELL, &table);
        assert_eq!(editor.value(), "old");
        editor.handle_key(&KeyEvent::new(KeyCode::Backspace));
        editor.handle_key(&KeyEvent::char('k'));
        assert!(editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "olk");
        // second commit with no edits changes nothing
        assert!(!editor.end_edit(CELL, &mut table).unwrap());
    }

    #[test]
    fn test_text_reset_and_max_chars() {
        let table = table_with("abc");
        let mut editor = TextEditor::new();
        editor.set_parameters("4").unwrap();
        editor.begin_edit(CELL, &table);
        editor.set_value("abcdefgh");
        assert_eq!(editor.value(), "abcd");
        editor.reset_value();
        assert_eq!(editor.value(), "abc");
        assert!(editor.set_parameters("lots").is_err());
    }

    #[test]
    fn test_starting_key_replaces_contents() {
        let table = table_with("abc");
        let mut editor = TextEditor::new();
        editor.begin_edit(CELL, &table);
        editor.starting_key(&KeyEvent::char('z'));
        assert_eq!(editor.value(), "z");
        assert!(!editor.is_accepted_key(&KeyEvent::char('c').with_ctrl()));
    }

    #[test_case("0,10", "42", "10" ; "clamped high")]
    #[test_case("0,10", "-3", "0" ; "clamped low")]
    #[test_case(",", "-3", "-3" ; "unbounded")]
    fn test_number_editor_range(params: &str, typed: &str, stored: &str) {
        let mut table = table_with("5");
        let mut editor = NumberEditor::default();
        editor.set_parameters(params).unwrap();
        editor.begin_edit(CELL, &table);
        editor.set_value(typed);
        assert!(editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), stored);
    }

    #[test]
    fn test_number_editor_rejects_text() {
        let mut table = table_with("5");
        let mut editor = NumberEditor::new(None, None);
        editor.begin_edit(CELL, &table);
        editor.set_value("five");
        assert!(!editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "5");
        assert_eq!(editor.value(), "5");
        assert!(editor.set_parameters("9,1").is_err());
        assert!(editor.is_accepted_key(&KeyEvent::char('7')));
        assert!(!editor.is_accepted_key(&KeyEvent::char('x')));
    }

    #[test]
    fn test_float_editor_formats() {
        let mut table = table_with("1");
        let mut editor = FloatEditor::new(None, Some(2));
        editor.begin_edit(CELL, &table);
        assert_eq!(editor.value(), "1.00");
        editor.set_value("2.5");
        assert!(editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "2.50");
    }

    #[test]
    fn test_bool_editor_toggles() {
        let mut table = table_with("0");
        let mut editor = BoolEditor::new();
        editor.begin_edit(CELL, &table);
        assert!(editor.is_accepted_key(&KeyEvent::char(' ')));
        editor.starting_key(&KeyEvent::char(' '));
        assert!(editor.is_checked());
        assert!(editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "1");
        editor.handle_key(&KeyEvent::char('-'));
        editor.reset_value();
        assert!(!editor.end_edit(CELL, &mut table).unwrap());
    }

    #[test]
    fn test_choice_editor() {
        let mut table = table_with("");
        let mut editor = ChoiceEditor::default();
        editor.set_parameters("Apple, Banana,Avocado").unwrap();
        assert_eq!(editor.choices(), &["Apple", "Banana", "Avocado"]);
        editor.begin_edit(CELL, &table);

        editor.handle_key(&KeyEvent::char('a'));
        assert_eq!(editor.value(), "Apple");
        editor.handle_key(&KeyEvent::char('a'));
        assert_eq!(editor.value(), "Avocado");
        assert!(editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "Avocado");

        editor.set_value("Cherry");
        assert!(!editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "Avocado");
    }

    #[test]
    fn test_choice_editor_allow_others() {
        let mut table = table_with("");
        let mut editor = ChoiceEditor::new(["x", "y"], true);
        editor.begin_edit(CELL, &table);
        editor.handle_key(&KeyEvent::char('z'));
        assert!(editor.end_edit(CELL, &mut table).unwrap());
        assert_eq!(table.value(CELL), "z");
        assert!(editor.select(1));
        assert!(!editor.select(5));
    }

    #[test]
    fn test_clone_box_is_independent() {
        let table = table_with("a");
        let mut editor = TextEditor::new();
        editor.begin_edit(CELL, &table);
        let mut copy = editor.clone_box();
        copy.set_value("b");
        assert_eq!(editor.value(), "a");
        assert_eq!(copy.name(), "text");
    }
}
