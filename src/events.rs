//! Notifications sent by a sheet to its handlers.
//!
//! Operations that change what the user sees send a vetoable "-ing" event
//! before acting and a plain event after. A handler vetoes by returning
//! [`EventResponse::Veto`]; the operation then leaves everything as it was
//! and reports "not applied". Vetoes of after-the-fact events are ignored.

use std::fmt;

use tracing::{debug, trace};

use crate::block::Block;
use crate::coords::Coords;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetEvent {
    /// About to select (`add`) or deselect a block. Vetoable.
    SelectingCells { block: Block, add: bool },
    SelectedCells { block: Block, add: bool },
    /// About to replace a cell's value. Vetoable.
    CellValueChanging {
        coords: Coords,
        old_value: String,
        new_value: String,
    },
    CellValueChanged {
        coords: Coords,
        old_value: String,
        new_value: String,
    },
    /// About to show the editor for a cell. Vetoable.
    EditorEnabling { coords: Coords },
    EditorEnabled { coords: Coords },
    EditorDisabled { coords: Coords },
    /// Rows inserted (`num > 0`) or deleted (`num < 0`) at `pos`.
    RowsChanged { pos: i32, num: i32 },
    ColsChanged { pos: i32, num: i32 },
}

impl SheetEvent {
    pub fn is_vetoable(&self) -> bool {
        matches!(
            self,
            SheetEvent::SelectingCells { .. }
                | SheetEvent::CellValueChanging { .. }
                | SheetEvent::EditorEnabling { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SheetEvent::SelectingCells { .. } => "selecting_cells",
            SheetEvent::SelectedCells { .. } => "selected_cells",
            SheetEvent::CellValueChanging { .. } => "cell_value_changing",
            SheetEvent::CellValueChanged { .. } => "cell_value_changed",
            SheetEvent::EditorEnabling { .. } => "editor_enabling",
            SheetEvent::EditorEnabled { .. } => "editor_enabled",
            SheetEvent::EditorDisabled { .. } => "editor_disabled",
            SheetEvent::RowsChanged { .. } => "rows_changed",
            SheetEvent::ColsChanged { .. } => "cols_changed",
        }
    }
}

impl fmt::Display for SheetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResponse {
    #[default]
    Allow,
    Veto,
}

/// Receives sheet events.
pub trait SheetEventHandler {
    fn handle(&mut self, event: &SheetEvent) -> EventResponse;
}

impl<F> SheetEventHandler for F
where
    F: FnMut(&SheetEvent) -> EventResponse,
{
    fn handle(&mut self, event: &SheetEvent) -> EventResponse {
        self(event)
    }
}

/// Ordered list of handlers attached to one sheet window.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Box<dyn SheetEventHandler>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler(&mut self, handler: impl SheetEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Send `event` to every handler in order. A vetoable event stops at
    /// the first veto.
    pub fn send(&mut self, event: &SheetEvent) -> EventResponse {
        trace!(target: "sheet::events", event = event.name(), "send");
        for handler in &mut self.handlers {
            if handler.handle(event) == EventResponse::Veto {
                if event.is_vetoable() {
                    debug!(target: "sheet::events", event = event.name(), "vetoed");
                    return EventResponse::Veto;
                }
                debug!(target: "sheet::events", event = event.name(), "veto ignored");
            }
        }
        EventResponse::Allow
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_first_veto_stops_delivery() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_handler(|_: &SheetEvent| EventResponse::Veto);
        let log = Rc::clone(&seen);
        dispatcher.add_handler(move |e: &SheetEvent| {
            log.borrow_mut().push(e.name());
            EventResponse::Allow
        });

        let event = SheetEvent::EditorEnabling {
            coords: Coords::new(0, 0),
        };
        assert_eq!(dispatcher.send(&event), EventResponse::Veto);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_veto_of_notification_is_ignored() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_handler(|_: &SheetEvent| EventResponse::Veto);
        let log = Rc::clone(&seen);
        dispatcher.add_handler(move |e: &SheetEvent| {
            log.borrow_mut().push(e.name());
            EventResponse::Allow
        });

        let event = SheetEvent::RowsChanged { pos: 1, num: 2 };
        assert_eq!(dispatcher.send(&event), EventResponse::Allow);
        assert_eq!(*seen.borrow(), vec!["rows_changed"]);
    }

    #[test]
    fn test_vetoable_kinds() {
        let block = Block::new(0, 0, 1, 1);
        assert!(SheetEvent::SelectingCells { block, add: true }.is_vetoable());
        assert!(!SheetEvent::SelectedCells { block, add: true }.is_vetoable());
        assert!(!SheetEvent::EditorDisabled { coords: Coords::CORNER }.is_vetoable());
        assert_eq!(SheetEvent::ColsChanged { pos: 0, num: -1 }.to_string(), "cols_changed");
    }
}
