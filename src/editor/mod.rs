//! Cell editing.
//!
//! A [`CellEditor`] is a headless stand-in for the native control that
//! would sit over the cell being edited: it loads the cell's value on
//! [`CellEditor::begin_edit`], is fed keys or whole strings while the user
//! types, and writes the result back on [`CellEditor::end_edit`].

mod editors;

pub use editors::{BoolEditor, ChoiceEditor, FloatEditor, NumberEditor, TextEditor};

use crate::coords::Coords;
use crate::error::Result;
use crate::table::SheetTable;

/// Keys an editor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Escape,
    Tab,
    Left,
    Right,
    Up,
    Down,
    F2,
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// The typed character, if this is a plain (unmodified by ctrl/alt)
    /// printable key.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.ctrl && !self.alt && !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Edits cells of one data type.
pub trait CellEditor {
    fn name(&self) -> &'static str;

    /// Load the value of `coords` into the editor.
    fn begin_edit(&mut self, coords: Coords, table: &dyn SheetTable);

    /// Write the edited value back to `table`. Returns true if the cell
    /// changed.
    fn end_edit(&mut self, coords: Coords, table: &mut dyn SheetTable) -> Result<bool>;

    /// Discard edits, going back to the value loaded by `begin_edit`.
    fn reset_value(&mut self);

    /// Current contents of the editor.
    fn value(&self) -> String;

    /// Replace the contents, as if the user had typed `value`.
    fn set_value(&mut self, value: &str);

    /// Whether `key` may start editing this cell.
    fn is_accepted_key(&self, key: &KeyEvent) -> bool {
        key.printable().is_some()
    }

    /// Editing was started by `key`: the key replaces the contents.
    fn starting_key(&mut self, key: &KeyEvent) {
        if let Some(c) = key.printable() {
            self.set_value(&c.to_string());
        }
    }

    /// Apply a key press while editing. Returns true if the key was used.
    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let mut text = self.value();
        match key.code {
            KeyCode::Backspace => {
                text.pop();
            }
            _ => match key.printable() {
                Some(c) => text.push(c),
                None => return false,
            },
        }
        self.set_value(&text);
        true
    }

    /// Configure from an editor-specific parameter string.
    fn set_parameters(&mut self, _params: &str) -> Result<()> {
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn CellEditor>;
}
