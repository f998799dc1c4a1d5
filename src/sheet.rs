//! The sheet: shared model plus the window handles that view it.
//!
//! [`SheetRefData`] owns everything about a sheet that is independent of
//! any one window: the table, row/column edges, the selection, spanned
//! cells, stored attrs and the four complete area default attrs. A
//! [`Sheet`] is a window handle over that data; [`Sheet::split`] makes a
//! second handle over the same data, so a change made through one is seen
//! by both.
//!
//! Operations a user would notice send events through the handle's
//! [`EventDispatcher`]. The model is never borrowed while handlers run, so a
//! handler may query any handle sharing it.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::attr::{
    share_editor, share_renderer, Alignment, AttrKind, AttrLevel, CellAttr, CellAttrProvider,
    HAlign, Orientation, SharedEditor, VAlign,
};
use crate::block::Block;
use crate::clipboard::CopiedCells;
use crate::config::SheetConfig;
use crate::coords::{CellCategory, Coords};
use crate::editor::TextEditor;
use crate::error::{Result, SheetError};
use crate::events::{EventDispatcher, EventResponse, SheetEvent, SheetEventHandler};
use crate::layout::{ArrayEdge, Rect, SheetLayout, Viewport};
use crate::render::{CellDraw, SheetResources, StringRenderer, Surface};
use crate::selection::{Selection, SelectionMode, SelectionPolicy};
use crate::table::SheetTable;

/// Model shared by every window of one sheet.
pub struct SheetRefData {
    table: Box<dyn SheetTable>,
    layout: SheetLayout,
    selection: Selection,
    spans: Selection,
    attrs: CellAttrProvider,
    grid_default: CellAttr,
    row_label_default: CellAttr,
    col_label_default: CellAttr,
    corner_default: CellAttr,
    cursor: Option<Coords>,
    selection_mode: SelectionMode,
}

impl fmt::Debug for SheetRefData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetRefData")
            .field("rows", &self.table.number_rows())
            .field("cols", &self.table.number_cols())
            .field("selection", &self.selection)
            .field("spans", &self.spans.len())
            .field("attrs", &self.attrs.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

// Complete attr used as the last fallback for one area of the sheet.
fn area_default(config: &SheetConfig, label: bool) -> CellAttr {
    let attr = CellAttr::new();
    let colours = &config.colours;
    if label {
        attr.set_foreground(colours.label_foreground);
        attr.set_background(colours.label_background);
        attr.set_font(config.font.clone().bold());
        attr.set_alignment(Alignment::new(HAlign::Centre, VAlign::Centre));
        attr.set_overflow(false);
        attr.set_overflow_marker(false);
    } else {
        attr.set_foreground(colours.cell_foreground);
        attr.set_background(colours.cell_background);
        attr.set_font(config.font.clone());
        attr.set_alignment(Alignment::default());
        attr.set_overflow(true);
        attr.set_overflow_marker(true);
    }
    attr.set_orientation(Orientation::Horizontal);
    attr.set_read_only(false);
    attr.set_show_editor(false);
    attr.set_level(AttrLevel::Bottom);
    attr.set_renderer(share_renderer(StringRenderer));
    attr.set_editor(share_editor(TextEditor::new()));
    attr.set_kind(AttrKind::Default);
    attr
}

// New position of `index` after `num` entries are inserted (or `-num`
// deleted) at `pos`; `None` if it was deleted.
fn shift_index(index: i32, pos: i32, num: i32) -> Option<i32> {
    if index < pos {
        Some(index)
    } else if num >= 0 {
        Some(index + num)
    } else if index < pos - num {
        None
    } else {
        Some(index + num)
    }
}

impl SheetRefData {
    pub fn new(table: impl SheetTable + 'static, config: &SheetConfig) -> Self {
        let mut config = config.clone();
        config.normalize();
        let rows = ArrayEdge::new(
            table.number_rows(),
            config.default_row_height,
            config.min_row_height,
        );
        let cols = ArrayEdge::new(
            table.number_cols(),
            config.default_col_width,
            config.min_col_width,
        );
        Self {
            table: Box::new(table),
            layout: SheetLayout::new(rows, cols, config.row_label_width, config.col_label_height),
            selection: Selection::new(),
            spans: Selection::with_policy(SelectionPolicy::Multiple),
            attrs: CellAttrProvider::new(),
            grid_default: area_default(&config, false),
            row_label_default: area_default(&config, true),
            col_label_default: area_default(&config, true),
            corner_default: area_default(&config, true),
            cursor: None,
            selection_mode: config.selection_mode,
        }
    }

    pub fn table(&self) -> &dyn SheetTable {
        self.table.as_ref()
    }

    pub fn table_mut(&mut self) -> &mut dyn SheetTable {
        self.table.as_mut()
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut SheetLayout {
        &mut self.layout
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Spanned cells, one block per span.
    pub fn spans(&self) -> &Selection {
        &self.spans
    }

    pub fn attr_provider(&self) -> &CellAttrProvider {
        &self.attrs
    }

    pub fn attr_provider_mut(&mut self) -> &mut CellAttrProvider {
        &mut self.attrs
    }

    pub fn cursor(&self) -> Option<Coords> {
        self.cursor
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn number_rows(&self) -> i32 {
        self.layout.number_rows()
    }

    pub fn number_cols(&self) -> i32 {
        self.layout.number_cols()
    }

    /// Whole grid as a block.
    pub fn grid_block(&self) -> Block {
        Block::new(0, 0, self.number_rows(), self.number_cols())
    }

    pub fn contains_coords(&self, coords: Coords) -> bool {
        self.layout.contains_coords(coords)
    }

    /// The complete default attr for the area `coords` lies in.
    pub fn default_attr(&self, coords: Coords) -> Result<CellAttr> {
        match coords.category() {
            CellCategory::Grid => Ok(self.grid_default.clone()),
            CellCategory::RowLabel => Ok(self.row_label_default.clone()),
            CellCategory::ColLabel => Ok(self.col_label_default.clone()),
            CellCategory::Corner => Ok(self.corner_default.clone()),
            CellCategory::Unknown => Err(SheetError::InvalidCoords(coords)),
        }
    }

    /// Attr for `coords` resolving through the area default once its own
    /// chain ends, so every property resolves.
    ///
    /// `Any` falls back to the area default itself when nothing is stored;
    /// the specific kinds return an uncreated attr in that case. `Default`
    /// returns the area default. Stored attrs are never rewired here: when
    /// a chain does not already end in this area's default, the result is a
    /// transient copy of its layers chained to it.
    pub fn get_attr(&self, coords: Coords, kind: AttrKind) -> Result<CellAttr> {
        let default = self.default_attr(coords)?;
        if kind == AttrKind::Default {
            return Ok(default);
        }
        let attr = self.attrs.get_attr(coords, kind)?;
        if !attr.is_ok() {
            return Ok(if kind == AttrKind::Any {
                default
            } else {
                attr
            });
        }
        self.resolve_through(attr, &default)
    }

    /// Store `attr`. For `Default` the area default is updated in place with
    /// the properties `attr` sets, so attrs already chained to it see the
    /// change. Other attrs get the area default installed at the end of
    /// their chain unless it already ends in an area default.
    pub fn set_attr(&mut self, coords: Coords, attr: CellAttr, kind: AttrKind) -> Result<()> {
        let default = self.default_attr(coords)?;
        if kind == AttrKind::Default {
            return default.update_with(&attr);
        }
        self.attrs.set_attr(coords, attr.clone(), kind)?;
        if attr.is_ok() {
            let tail = attr.chain_tail();
            if !self.is_area_default(&tail) {
                tail.set_default_attr(&default)?;
            }
        }
        Ok(())
    }

    fn is_area_default(&self, attr: &CellAttr) -> bool {
        [
            &self.grid_default,
            &self.row_label_default,
            &self.col_label_default,
            &self.corner_default,
        ]
        .iter()
        .any(|d| d.ptr_eq(attr))
    }

    /// `attr` if its chain already ends in `default`, else shallow copies of
    /// its layers (up to any other area default) chained to `default`.
    fn resolve_through(&self, attr: CellAttr, default: &CellAttr) -> Result<CellAttr> {
        let mut layers = Vec::new();
        let mut walk = attr.clone();
        while walk.is_ok() && !self.is_area_default(&walk) {
            let next = walk.default_attr();
            layers.push(walk);
            walk = next;
        }
        if walk.ptr_eq(default) {
            return Ok(attr);
        }
        trace!(target: "sheet::attr", layers = layers.len(), "resolving through transient chain");
        let mut chain = default.clone();
        for layer in layers.iter().rev() {
            let copy = layer.shallow_copy();
            copy.set_default_attr(&chain)?;
            chain = copy;
        }
        if !chain.ptr_eq(default) {
            chain.set_kind(attr.kind());
        }
        Ok(chain)
    }

    /// Top-left cell of the span covering `coords`, else `coords`.
    pub fn cell_owner(&self, coords: Coords) -> Coords {
        self.spans
            .index(coords)
            .and_then(|i| self.spans.block(i))
            .map_or(coords, |b| b.top_left())
    }

    /// Span block covering `coords`, or the single cell.
    pub fn cell_block(&self, coords: Coords) -> Block {
        self.spans
            .index(coords)
            .and_then(|i| self.spans.block(i))
            .unwrap_or_else(|| Block::cell(coords))
    }

    /// Grow `block` until it cuts no span in two.
    pub fn expand_spans(&self, block: &Block) -> Block {
        let mut out = *block;
        loop {
            let grown = self
                .spans
                .blocks()
                .iter()
                .filter(|s| s.intersects(&out))
                .fold(out, |acc, s| acc.union(s));
            if grown == out {
                return out;
            }
            out = grown;
        }
    }

    /// Bounds of a cell in its window; a spanned cell covers its whole span.
    pub fn cell_to_rect(&self, coords: Coords) -> Option<Rect> {
        if coords.is_grid_cell() {
            let block = self.cell_block(coords);
            if !block.is_one_cell() {
                return self.layout.block_rect(&block);
            }
        }
        self.layout.cell_rect(coords)
    }

    /// Bounds of a block of grid cells, widened to whole spans.
    pub fn block_to_rect(&self, block: &Block) -> Option<Rect> {
        self.layout.block_rect(&self.expand_spans(block))
    }

    /// Grid cell under a grid-window pixel, resolved to its span owner.
    pub fn xy_to_grid_cell(&self, x: i32, y: i32) -> Option<Coords> {
        self.layout
            .xy_to_cell(x, y, false)
            .map(|c| self.cell_owner(c))
    }

    fn check_grid_cell(&self, coords: Coords) -> Result<()> {
        if coords.is_grid_cell() && self.contains_coords(coords) {
            Ok(())
        } else {
            Err(SheetError::InvalidCoords(coords))
        }
    }

    // Selection block for `block` under the current mode, clipped to the grid.
    fn selection_block(&self, block: Block) -> Block {
        self.selection_mode
            .expand(block, self.number_rows(), self.number_cols())
            .intersect(&self.grid_block())
    }

    fn update_rows(&mut self, pos: i32, num: i32) -> Result<()> {
        self.layout.rows.update_pos(pos, num)?;
        self.selection.update_rows(pos, num);
        self.spans.update_rows(pos, num);
        self.attrs.update_rows(pos, num);
        let rows = self.number_rows();
        self.cursor = self.cursor.and_then(|c| {
            let row = shift_index(c.row, pos, num).unwrap_or(pos).min(rows - 1);
            (row >= 0).then(|| Coords::new(row, c.col))
        });
        Ok(())
    }

    fn update_cols(&mut self, pos: i32, num: i32) -> Result<()> {
        self.layout.cols.update_pos(pos, num)?;
        self.selection.update_cols(pos, num);
        self.spans.update_cols(pos, num);
        self.attrs.update_cols(pos, num);
        let cols = self.number_cols();
        self.cursor = self.cursor.and_then(|c| {
            let col = shift_index(c.col, pos, num).unwrap_or(pos).min(cols - 1);
            (col >= 0).then(|| Coords::new(c.row, col))
        });
        Ok(())
    }
}

// Resolve the attr of `coords` and draw it with the attr's renderer.
fn draw_cell(
    data: &SheetRefData,
    surface: &mut dyn Surface,
    resources: &SheetResources,
    coords: Coords,
    rect: Rect,
    selected: bool,
) -> Result<()> {
    let attr = data.get_attr(coords, AttrKind::Any)?;
    if let Some(renderer) = attr.renderer() {
        let cell = CellDraw {
            table: data.table(),
            attr: &attr,
            resources,
            rect,
            coords,
            selected,
        };
        renderer.draw(surface, &cell);
    }
    Ok(())
}

struct EditSession {
    coords: Coords,
    editor: SharedEditor,
}

/// A window handle over shared sheet data.
pub struct Sheet {
    data: Rc<RefCell<SheetRefData>>,
    events: EventDispatcher,
    edit: Option<EditSession>,
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("data", &self.data)
            .field("events", &self.events)
            .field("editing", &self.edit.as_ref().map(|e| e.coords))
            .finish()
    }
}

impl Sheet {
    pub fn new(table: impl SheetTable + 'static) -> Self {
        Self::with_config(table, &SheetConfig::default())
    }

    pub fn with_config(table: impl SheetTable + 'static, config: &SheetConfig) -> Self {
        Self::from_ref_data(Rc::new(RefCell::new(SheetRefData::new(table, config))))
    }

    /// A window over existing shared data.
    pub fn from_ref_data(data: Rc<RefCell<SheetRefData>>) -> Self {
        Self {
            data,
            events: EventDispatcher::new(),
            edit: None,
        }
    }

    /// A second window sharing this one's data. It starts with no event
    /// handlers and no open editor.
    pub fn split(&self) -> Sheet {
        debug!(target: "sheet::events", "split view created");
        Self::from_ref_data(Rc::clone(&self.data))
    }

    pub fn ref_data(&self) -> Rc<RefCell<SheetRefData>> {
        Rc::clone(&self.data)
    }

    pub fn shares_data_with(&self, other: &Sheet) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Read access to the shared data. Do not hold this across calls that
    /// send events.
    pub fn data(&self) -> Ref<'_, SheetRefData> {
        self.data.borrow()
    }

    /// Direct write access; bypasses events.
    pub fn data_mut(&self) -> RefMut<'_, SheetRefData> {
        self.data.borrow_mut()
    }

    pub fn add_event_handler(&mut self, handler: impl SheetEventHandler + 'static) {
        self.events.add_handler(handler);
    }

    fn send(&mut self, event: &SheetEvent) -> bool {
        self.events.send(event) == EventResponse::Allow
    }

    pub fn number_rows(&self) -> i32 {
        self.data.borrow().number_rows()
    }

    pub fn number_cols(&self) -> i32 {
        self.data.borrow().number_cols()
    }

    pub fn cell_value(&self, coords: Coords) -> String {
        self.data.borrow().table().value(coords)
    }

    // Attrs

    pub fn get_attr(&self, coords: Coords, kind: AttrKind) -> Result<CellAttr> {
        self.data.borrow().get_attr(coords, kind)
    }

    pub fn set_attr(&self, coords: Coords, attr: CellAttr, kind: AttrKind) -> Result<()> {
        self.data.borrow_mut().set_attr(coords, attr, kind)
    }

    /// Stored attr of `kind` for `coords`, creating and storing an empty
    /// one if there is none.
    pub fn get_or_create_attr(&self, coords: Coords, kind: AttrKind) -> Result<CellAttr> {
        if matches!(kind, AttrKind::Any | AttrKind::Default) {
            return Err(SheetError::InvalidAttrKind { kind, coords });
        }
        let mut data = self.data.borrow_mut();
        let stored = data.attrs.get_attr(coords, kind)?;
        if stored.is_ok() {
            return Ok(stored);
        }
        let attr = CellAttr::new();
        data.set_attr(coords, attr.clone(), kind)?;
        Ok(attr)
    }

    // Geometry

    pub fn cell_to_rect(&self, coords: Coords) -> Option<Rect> {
        self.data.borrow().cell_to_rect(coords)
    }

    pub fn block_to_rect(&self, block: &Block) -> Option<Rect> {
        self.data.borrow().block_to_rect(block)
    }

    pub fn xy_to_grid_cell(&self, x: i32, y: i32) -> Option<Coords> {
        self.data.borrow().xy_to_grid_cell(x, y)
    }

    pub fn set_row_height(&self, row: i32, height: i32) -> Result<()> {
        self.data.borrow_mut().layout.rows.set_size(row, height)
    }

    pub fn set_col_width(&self, col: i32, width: i32) -> Result<()> {
        self.data.borrow_mut().layout.cols.set_size(col, width)
    }

    pub fn row_height(&self, row: i32) -> i32 {
        self.data.borrow().layout.row_height(row)
    }

    pub fn col_width(&self, col: i32) -> i32 {
        self.data.borrow().layout.col_width(col)
    }

    // Spans

    /// Make `coords` span `height` x `width` cells. Spans it overlaps are
    /// removed first; a 1 x 1 span just removes the span at `coords`.
    pub fn set_cell_span(&self, coords: Coords, height: i32, width: i32) -> Result<()> {
        if height < 1 || width < 1 {
            return Err(SheetError::InvalidParameter(format!("span {height}x{width}")));
        }
        let mut data = self.data.borrow_mut();
        data.check_grid_cell(coords)?;
        let block = Block::new(coords.row, coords.col, height, width).intersect(&data.grid_block());
        let removed = data.spans.remove_intersecting(&block);
        if !block.is_one_cell() {
            data.spans.select_block(block, false);
        }
        trace!(target: "sheet::selection", %coords, %block, removed = removed.len(), "cell span set");
        Ok(())
    }

    pub fn cell_owner(&self, coords: Coords) -> Coords {
        self.data.borrow().cell_owner(coords)
    }

    pub fn cell_block(&self, coords: Coords) -> Block {
        self.data.borrow().cell_block(coords)
    }

    // Cursor and selection

    pub fn grid_cursor(&self) -> Option<Coords> {
        self.data.borrow().cursor
    }

    /// Move the cursor to the owner of `coords`.
    pub fn set_grid_cursor(&self, coords: Coords) -> Result<()> {
        let mut data = self.data.borrow_mut();
        data.check_grid_cell(coords)?;
        data.cursor = Some(data.cell_owner(coords));
        Ok(())
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.data.borrow().selection_mode
    }

    /// Change the selection mode. The selection is cleared without events.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        let mut data = self.data.borrow_mut();
        if data.selection_mode != mode {
            data.selection_mode = mode;
            data.selection.clear();
        }
    }

    pub fn is_cell_selected(&self, coords: Coords) -> bool {
        self.data.borrow().selection.contains(coords)
    }

    pub fn has_selection(&self) -> bool {
        self.data.borrow().selection.has_selection()
    }

    /// Add `block` to the selection. Returns false if the block is empty
    /// or a handler vetoed it.
    pub fn select_block(&mut self, block: Block) -> bool {
        let block = self.data.borrow().selection_block(block);
        if block.is_empty() {
            return false;
        }
        if !self.send(&SheetEvent::SelectingCells { block, add: true }) {
            return false;
        }
        let added = self.data.borrow_mut().selection.select_block(block, true);
        trace!(target: "sheet::selection", %block, added = added.len(), "selected");
        self.send(&SheetEvent::SelectedCells { block, add: true });
        true
    }

    /// Remove `block` from the selection. Returns false if nothing was
    /// selected there or a handler vetoed it.
    pub fn deselect_block(&mut self, block: Block) -> bool {
        let block = {
            let data = self.data.borrow();
            let block = data.selection_block(block);
            if data.selection.index_intersects(&block).is_none() {
                return false;
            }
            block
        };
        if !self.send(&SheetEvent::SelectingCells { block, add: false }) {
            return false;
        }
        let removed = self.data.borrow_mut().selection.deselect_block(block, true);
        trace!(target: "sheet::selection", %block, removed = removed.len(), "deselected");
        self.send(&SheetEvent::SelectedCells { block, add: false });
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        let block = self.data.borrow().selection.bounding_block();
        if block.is_empty() {
            return false;
        }
        if !self.send(&SheetEvent::SelectingCells { block, add: false }) {
            return false;
        }
        self.data.borrow_mut().selection.clear();
        self.send(&SheetEvent::SelectedCells { block, add: false });
        true
    }

    // Values and editing

    /// Set a cell's value. Returns false, leaving the cell as it was, if
    /// the value is unchanged, the cell is read-only or a handler vetoed.
    pub fn set_cell_value(&mut self, coords: Coords, value: &str) -> Result<bool> {
        let old_value = {
            let data = self.data.borrow();
            if !data.contains_coords(coords) {
                return Err(SheetError::InvalidCoords(coords));
            }
            if data.get_attr(coords, AttrKind::Any)?.read_only() {
                debug!(target: "sheet::events", %coords, "edit of read-only cell refused");
                return Ok(false);
            }
            data.table().value(coords)
        };
        if old_value == value {
            return Ok(false);
        }
        let new_value = value.to_string();
        let changing = SheetEvent::CellValueChanging {
            coords,
            old_value: old_value.clone(),
            new_value: new_value.clone(),
        };
        if !self.send(&changing) {
            return Ok(false);
        }
        self.data.borrow_mut().table_mut().set_value(coords, value)?;
        self.send(&SheetEvent::CellValueChanged {
            coords,
            old_value,
            new_value,
        });
        Ok(true)
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn edit_coords(&self) -> Option<Coords> {
        self.edit.as_ref().map(|e| e.coords)
    }

    /// The open editor, for feeding keys or text.
    pub fn active_editor(&self) -> Option<SharedEditor> {
        self.edit.as_ref().map(|e| Rc::clone(&e.editor))
    }

    /// Open the attr's editor on `coords`. An edit already open elsewhere
    /// is saved first. Returns false for read-only cells, cells with no
    /// editor, or on veto.
    pub fn enable_cell_edit(&mut self, coords: Coords) -> Result<bool> {
        if self.edit_coords() == Some(coords) {
            return Ok(true);
        }
        if self.is_editing() {
            self.save_edit()?;
        }
        let attr = {
            let data = self.data.borrow();
            if !data.contains_coords(coords) {
                return Err(SheetError::InvalidCoords(coords));
            }
            data.get_attr(coords, AttrKind::Any)?
        };
        if attr.read_only() {
            return Ok(false);
        }
        let Some(editor) = attr.editor() else {
            warn!(target: "sheet::events", %coords, "no editor for cell");
            return Ok(false);
        };
        if !self.send(&SheetEvent::EditorEnabling { coords }) {
            return Ok(false);
        }
        editor
            .borrow_mut()
            .begin_edit(coords, self.data.borrow().table());
        self.edit = Some(EditSession { coords, editor });
        self.send(&SheetEvent::EditorEnabled { coords });
        Ok(true)
    }

    /// Close the editor, writing its value. Returns true if the cell
    /// changed. A vetoed change is rolled back.
    pub fn save_edit(&mut self) -> Result<bool> {
        let Some(EditSession { coords, editor }) = self.edit.take() else {
            return Ok(false);
        };
        let old_value = self.data.borrow().table().value(coords);
        let result = editor
            .borrow_mut()
            .end_edit(coords, self.data.borrow_mut().table_mut());
        let changed = match result {
            Ok(changed) => changed,
            Err(e) => {
                self.send(&SheetEvent::EditorDisabled { coords });
                return Err(e);
            }
        };

        let mut applied = false;
        if changed {
            let new_value = self.data.borrow().table().value(coords);
            let changing = SheetEvent::CellValueChanging {
                coords,
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            };
            if self.send(&changing) {
                self.send(&SheetEvent::CellValueChanged {
                    coords,
                    old_value,
                    new_value,
                });
                applied = true;
            } else {
                debug!(target: "sheet::events", %coords, "edit vetoed, value restored");
                self.data.borrow_mut().table_mut().set_value(coords, &old_value)?;
            }
        }
        self.send(&SheetEvent::EditorDisabled { coords });
        Ok(applied)
    }

    /// Close the editor without writing. Returns false if none was open.
    pub fn cancel_edit(&mut self) -> bool {
        let Some(EditSession { coords, editor }) = self.edit.take() else {
            return false;
        };
        editor.borrow_mut().reset_value();
        self.send(&SheetEvent::EditorDisabled { coords });
        true
    }

    // Rows and columns

    pub fn insert_rows(&mut self, pos: i32, num: i32) -> Result<()> {
        if num == 0 {
            return Ok(());
        }
        if num < 0 {
            return Err(SheetError::InvalidParameter(format!("insert {num} rows")));
        }
        self.cancel_edit();
        {
            let mut data = self.data.borrow_mut();
            data.table_mut().insert_rows(pos, num)?;
            data.update_rows(pos, num)?;
        }
        debug!(target: "sheet::table", pos, num, "rows inserted");
        self.send(&SheetEvent::RowsChanged { pos, num });
        Ok(())
    }

    pub fn append_rows(&mut self, num: i32) -> Result<()> {
        let rows = self.number_rows();
        self.insert_rows(rows, num)
    }

    pub fn delete_rows(&mut self, pos: i32, num: i32) -> Result<()> {
        if num == 0 {
            return Ok(());
        }
        if num < 0 {
            return Err(SheetError::InvalidParameter(format!("delete {num} rows")));
        }
        self.cancel_edit();
        {
            let mut data = self.data.borrow_mut();
            data.table_mut().delete_rows(pos, num)?;
            data.update_rows(pos, -num)?;
        }
        debug!(target: "sheet::table", pos, num, "rows deleted");
        self.send(&SheetEvent::RowsChanged { pos, num: -num });
        Ok(())
    }

    pub fn insert_cols(&mut self, pos: i32, num: i32) -> Result<()> {
        if num == 0 {
            return Ok(());
        }
        if num < 0 {
            return Err(SheetError::InvalidParameter(format!("insert {num} cols")));
        }
        self.cancel_edit();
        {
            let mut data = self.data.borrow_mut();
            data.table_mut().insert_cols(pos, num)?;
            data.update_cols(pos, num)?;
        }
        debug!(target: "sheet::table", pos, num, "cols inserted");
        self.send(&SheetEvent::ColsChanged { pos, num });
        Ok(())
    }

    pub fn append_cols(&mut self, num: i32) -> Result<()> {
        let cols = self.number_cols();
        self.insert_cols(cols, num)
    }

    pub fn delete_cols(&mut self, pos: i32, num: i32) -> Result<()> {
        if num == 0 {
            return Ok(());
        }
        if num < 0 {
            return Err(SheetError::InvalidParameter(format!("delete {num} cols")));
        }
        self.cancel_edit();
        {
            let mut data = self.data.borrow_mut();
            data.table_mut().delete_cols(pos, num)?;
            data.update_cols(pos, -num)?;
        }
        debug!(target: "sheet::table", pos, num, "cols deleted");
        self.send(&SheetEvent::ColsChanged { pos, num: -num });
        Ok(())
    }

    // Clipboard

    /// Values of the selected cells (or the cursor cell when nothing is
    /// selected), relative to the selection's top-left.
    pub fn copy_selection(&self) -> CopiedCells {
        let data = self.data.borrow();
        let (bounds, blocks): (Block, Vec<Block>) = if data.selection.has_selection() {
            (
                data.selection.bounding_block(),
                data.selection.blocks().to_vec(),
            )
        } else if let Some(cursor) = data.cursor {
            (Block::cell(cursor), vec![Block::cell(cursor)])
        } else {
            return CopiedCells::default();
        };

        let mut copied = CopiedCells::new(bounds.height, bounds.width);
        let origin = bounds.top_left();
        for block in &blocks {
            for coords in block.iter() {
                let value = data.table().value(coords);
                if !value.is_empty() {
                    copied.set_value(coords - origin, value);
                }
            }
        }
        trace!(target: "sheet::selection", %bounds, cells = copied.len(), "copied");
        copied
    }

    /// Write `cells` with their top-left at `at`. Cells falling outside the
    /// grid are skipped. Returns how many cells changed.
    pub fn paste_cells(&mut self, at: Coords, cells: &CopiedCells) -> Result<usize> {
        let grid = self.data.borrow().grid_block();
        let mut changed = 0;
        for (offset, value) in cells.iter() {
            let target = at + offset;
            if grid.contains(target) && self.set_cell_value(target, value)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Paste tab-separated text at `at`.
    pub fn paste_text(&mut self, at: Coords, text: &str) -> Result<usize> {
        self.paste_cells(at, &CopiedCells::from_text(text)?)
    }

    // Painting

    /// Draw the corner, labels and visible grid cells onto `surface`.
    ///
    /// The column labels sit to the right of the corner, the row labels
    /// below it, and the grid window fills the rest, scrolled by `viewport`.
    pub fn paint(
        &self,
        surface: &mut dyn Surface,
        viewport: &Viewport,
        resources: &SheetResources,
    ) -> Result<()> {
        let data = self.data.borrow();
        let layout = data.layout();
        let origin_x = layout.row_label_width;
        let origin_y = layout.col_label_height;
        let visible = viewport.visible_block(layout);

        if origin_x > 0 && origin_y > 0 {
            let corner = Rect::new(0, 0, origin_x, origin_y);
            draw_cell(&data, surface, resources, Coords::CORNER, corner, false)?;
        }

        if !visible.is_empty() {
            if origin_y > 0 {
                for col in visible.left()..=visible.right() {
                    let x = layout.cols.get_min(col) - viewport.scroll_x + origin_x;
                    let rect = Rect::new(x, 0, layout.col_width(col), origin_y);
                    draw_cell(&data, surface, resources, Coords::col_label(col), rect, false)?;
                }
            }
            if origin_x > 0 {
                for row in visible.top()..=visible.bottom() {
                    let y = layout.rows.get_min(row) - viewport.scroll_y + origin_y;
                    let rect = Rect::new(0, y, origin_x, layout.row_height(row));
                    draw_cell(&data, surface, resources, Coords::row_label(row), rect, false)?;
                }
            }

            let grid_window = Rect::new(origin_x, origin_y, viewport.width, viewport.height);
            surface.set_clip(Some(grid_window));
            for coords in visible.iter() {
                let owner = data.cell_owner(coords);
                // A span is drawn once, from its first visible cell.
                let first_visible =
                    Coords::new(owner.row.max(visible.top()), owner.col.max(visible.left()));
                if coords != first_visible {
                    continue;
                }
                let Some(rect) = data.cell_to_rect(owner) else {
                    continue;
                };
                let rect = Rect::new(
                    rect.x - viewport.scroll_x + origin_x,
                    rect.y - viewport.scroll_y + origin_y,
                    rect.width,
                    rect.height,
                );
                let selected = data.selection.contains(owner);
                draw_cell(&data, surface, resources, owner, rect, selected)?;
            }
            paint_grid_lines(surface, &data, viewport, visible, resources);
            surface.set_clip(None);
        }
        Ok(())
    }
}

fn paint_grid_lines(
    surface: &mut dyn Surface,
    data: &SheetRefData,
    viewport: &Viewport,
    visible: Block,
    resources: &SheetResources,
) {
    let layout = data.layout();
    let origin_x = layout.row_label_width;
    let origin_y = layout.col_label_height;
    let right = layout.cols.get_max(visible.right()) - viewport.scroll_x + origin_x;
    let bottom = layout.rows.get_max(visible.bottom()) - viewport.scroll_y + origin_y;
    let colour = resources.grid_line_colour;
    for row in visible.top()..=visible.bottom() {
        let y = layout.rows.get_max(row) - viewport.scroll_y + origin_y;
        surface.draw_line(origin_x, y, right, y, colour);
    }
    for col in visible.left()..=visible.right() {
        let x = layout.cols.get_max(col) - viewport.scroll_x + origin_x;
        surface.draw_line(x, origin_y, x, bottom, colour);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::color::Colour;
    use crate::render::{DrawOp, RecordingSurface};
    use crate::table::StringTable;
    use test_case::test_case;

    fn sheet(rows: i32, cols: i32) -> Sheet {
        Sheet::new(StringTable::new(rows, cols))
    }

    #[test_case(2, 1, 1, Some(2) ; "before insert point")]
    #[test_case(5, 3, 2, Some(7) ; "after insert point")]
    #[test_case(4, 3, -2, None ; "inside deleted range")]
    #[test_case(6, 3, -2, Some(4) ; "after deleted range")]
    fn test_shift_index(index: i32, pos: i32, num: i32, expected: Option<i32>) {
        assert_eq!(shift_index(index, pos, num), expected);
    }

    #[test]
    fn test_area_defaults_are_complete() {
        let sheet = sheet(3, 3);
        for coords in [
            Coords::new(0, 0),
            Coords::row_label(0),
            Coords::col_label(0),
            Coords::CORNER,
        ] {
            let attr = sheet.get_attr(coords, AttrKind::Default).unwrap();
            assert!(attr.is_complete(), "{coords}");
            assert_eq!(attr.kind(), AttrKind::Default);
        }
        assert!(sheet.get_attr(Coords::new(-2, 0), AttrKind::Any).is_err());
    }

    #[test]
    fn test_get_attr_chains_area_default() {
        let sheet = sheet(5, 5);
        let attr = sheet.get_or_create_attr(Coords::new(1, 1), AttrKind::Cell).unwrap();
        attr.set_foreground(Colour::RED);

        let resolved = sheet.get_attr(Coords::new(1, 1), AttrKind::Any).unwrap();
        assert!(resolved.ptr_eq(&attr));
        assert_eq!(resolved.foreground(), Colour::RED);
        assert_eq!(resolved.background(), Colour::WHITE);
        assert!(resolved.renderer().is_some());

        // Resolving twice does not grow the chain.
        let again = sheet.get_attr(Coords::new(1, 1), AttrKind::Any).unwrap();
        assert_eq!(again.chain_len(), 2);
    }

    #[test]
    fn test_attr_shared_by_grid_cell_and_label() {
        let mut sheet = sheet(3, 3);
        let shared = CellAttr::new();
        shared.set_foreground(Colour::RED);
        sheet
            .set_attr(Coords::new(1, 1), shared.clone(), AttrKind::Cell)
            .unwrap();
        sheet
            .set_attr(Coords::row_label(1), shared.clone(), AttrKind::Cell)
            .unwrap();
        sheet.select_block(Block::new(0, 0, 1, 1));

        for _ in 0..3 {
            let grid = sheet.get_attr(Coords::new(1, 1), AttrKind::Any).unwrap();
            assert!(grid.ptr_eq(&shared));
            assert_eq!(grid.foreground(), Colour::RED);
            assert_eq!(grid.background(), Colour::WHITE);

            let label = sheet.get_attr(Coords::row_label(1), AttrKind::Any).unwrap();
            assert_eq!(label.foreground(), Colour::RED);
            assert_eq!(label.background(), Colour::LABEL_FACE);
            assert!(label.font().bold);

            let other = sheet.get_attr(Coords::new(2, 2), AttrKind::Any).unwrap();
            assert_eq!(other.chain_len(), 1);

            let mut surface = RecordingSurface::new();
            sheet
                .paint(&mut surface, &Viewport::new(400, 300), &SheetResources::default())
                .unwrap();
        }

        for coords in [Coords::new(0, 0), Coords::row_label(0), Coords::CORNER] {
            let default = sheet.get_attr(coords, AttrKind::Default).unwrap();
            assert!(!default.has_default_attr());
        }

        // Changes to the shared attr reach both lookups.
        shared.set_foreground(Colour::BLUE);
        let label = sheet.get_attr(Coords::row_label(1), AttrKind::Any).unwrap();
        assert_eq!(label.foreground(), Colour::BLUE);
    }

    #[test]
    fn test_set_attr_installs_area_default() {
        let sheet = sheet(3, 3);
        let attr = CellAttr::new();
        attr.set_background(Colour::GREEN);
        sheet
            .set_attr(Coords::new(0, 2), attr.clone(), AttrKind::Col)
            .unwrap();
        let grid_default = sheet.get_attr(Coords::new(0, 0), AttrKind::Default).unwrap();
        assert!(attr.default_attr().ptr_eq(&grid_default));
        let got = sheet.get_attr(Coords::new(2, 2), AttrKind::Col).unwrap();
        assert!(got.ptr_eq(&attr));
        assert_eq!(got.chain_len(), 2);
    }

    #[test]
    fn test_default_update_is_live() {
        let sheet = sheet(5, 5);
        let attr = sheet.get_or_create_attr(Coords::new(0, 0), AttrKind::Row).unwrap();
        let change = CellAttr::new();
        change.set_background(Colour::GREEN);
        sheet
            .set_attr(Coords::new(3, 3), change, AttrKind::Default)
            .unwrap();
        assert_eq!(attr.background(), Colour::GREEN);
        assert_eq!(
            sheet.get_attr(Coords::new(4, 4), AttrKind::Any).unwrap().background(),
            Colour::GREEN
        );
    }

    #[test]
    fn test_span_geometry() {
        let sheet = sheet(10, 10);
        sheet.set_cell_span(Coords::new(1, 1), 2, 3).unwrap();
        assert_eq!(sheet.cell_owner(Coords::new(2, 3)), Coords::new(1, 1));
        assert_eq!(sheet.cell_block(Coords::new(2, 2)), Block::new(1, 1, 2, 3));
        // rows are 25 high, cols 80 wide
        assert_eq!(
            sheet.cell_to_rect(Coords::new(2, 2)),
            Some(Rect::new(80, 25, 240, 50))
        );
        assert_eq!(sheet.xy_to_grid_cell(250, 60), Some(Coords::new(1, 1)));
        assert_eq!(
            sheet.block_to_rect(&Block::new(1, 0, 1, 2)),
            Some(Rect::new(0, 25, 320, 50))
        );

        sheet.set_cell_span(Coords::new(1, 1), 1, 1).unwrap();
        assert_eq!(sheet.cell_owner(Coords::new(2, 3)), Coords::new(2, 3));
        assert!(sheet.set_cell_span(Coords::new(1, 1), 0, 2).is_err());
    }

    #[test]
    fn test_overlapping_span_replaces_old() {
        let sheet = sheet(10, 10);
        sheet.set_cell_span(Coords::new(0, 0), 2, 2).unwrap();
        sheet.set_cell_span(Coords::new(1, 1), 2, 2).unwrap();
        assert_eq!(sheet.data().spans().len(), 1);
        assert_eq!(sheet.cell_owner(Coords::new(0, 0)), Coords::new(0, 0));
        assert_eq!(sheet.cell_owner(Coords::new(2, 2)), Coords::new(1, 1));
    }

    #[test]
    fn test_row_selection_mode() {
        let mut sheet = sheet(4, 6);
        sheet.set_selection_mode(SelectionMode::Rows);
        assert!(sheet.select_block(Block::new(1, 2, 1, 1)));
        assert!(sheet.is_cell_selected(Coords::new(1, 0)));
        assert!(sheet.is_cell_selected(Coords::new(1, 5)));
        assert!(!sheet.is_cell_selected(Coords::new(2, 0)));
    }

    #[test]
    fn test_select_outside_grid_is_refused() {
        let mut sheet = sheet(4, 4);
        assert!(!sheet.select_block(Block::new(10, 10, 2, 2)));
        assert!(!sheet.has_selection());
        assert!(!sheet.deselect_block(Block::new(0, 0, 1, 1)));
        assert!(!sheet.clear_selection());
    }

    #[test]
    fn test_cursor_follows_row_changes() {
        let mut sheet = sheet(10, 3);
        sheet.set_grid_cursor(Coords::new(5, 1)).unwrap();
        sheet.insert_rows(2, 3).unwrap();
        assert_eq!(sheet.grid_cursor(), Some(Coords::new(8, 1)));
        sheet.delete_rows(7, 4).unwrap();
        assert_eq!(sheet.grid_cursor(), Some(Coords::new(7, 1)));
        assert!(sheet.set_grid_cursor(Coords::new(20, 0)).is_err());
    }

    #[test]
    fn test_row_changes_reach_every_store() {
        let mut sheet = sheet(6, 4);
        sheet.set_cell_value(Coords::new(3, 0), "x").unwrap();
        sheet.set_row_height(3, 40).unwrap();
        sheet.select_block(Block::new(3, 0, 1, 2));
        sheet.set_cell_span(Coords::new(3, 2), 2, 2).unwrap();
        sheet
            .get_or_create_attr(Coords::new(3, 1), AttrKind::Cell)
            .unwrap()
            .set_foreground(Colour::RED);

        sheet.insert_rows(1, 2).unwrap();
        assert_eq!(sheet.number_rows(), 8);
        assert_eq!(sheet.cell_value(Coords::new(5, 0)), "x");
        assert_eq!(sheet.row_height(5), 40);
        assert!(sheet.is_cell_selected(Coords::new(5, 1)));
        assert_eq!(sheet.cell_block(Coords::new(6, 3)), Block::new(5, 2, 2, 2));
        let attr = sheet.get_attr(Coords::new(5, 1), AttrKind::Cell).unwrap();
        assert_eq!(attr.foreground(), Colour::RED);

        sheet.delete_rows(1, 2).unwrap();
        assert_eq!(sheet.cell_value(Coords::new(3, 0)), "x");
        assert_eq!(sheet.row_height(3), 40);
        assert!(sheet.is_cell_selected(Coords::new(3, 1)));
    }

    #[test]
    fn test_delete_cols_out_of_range() {
        let mut sheet = sheet(3, 3);
        assert!(sheet.delete_cols(2, 5).is_err());
        assert_eq!(sheet.number_cols(), 3);
        assert!(sheet.insert_cols(0, -1).is_err());
    }

    #[test]
    fn test_append_cols() {
        let mut sheet = sheet(2, 2);
        sheet.append_cols(3).unwrap();
        assert_eq!(sheet.number_cols(), 5);
        assert_eq!(sheet.data().table().number_cols(), 5);
        assert_eq!(sheet.col_width(4), 80);
    }

    #[test]
    fn test_read_only_cell_refuses_value() {
        let mut sheet = sheet(3, 3);
        sheet
            .get_or_create_attr(Coords::new(0, 0), AttrKind::Cell)
            .unwrap()
            .set_read_only(true);
        assert!(!sheet.set_cell_value(Coords::new(0, 0), "x").unwrap());
        assert!(!sheet.enable_cell_edit(Coords::new(0, 0)).unwrap());
        assert_eq!(sheet.cell_value(Coords::new(0, 0)), "");
        assert!(sheet.set_cell_value(Coords::new(9, 9), "x").is_err());
    }

    #[test]
    fn test_edit_lifecycle() {
        let mut sheet = sheet(3, 3);
        sheet.set_cell_value(Coords::new(1, 1), "old").unwrap();
        assert!(sheet.enable_cell_edit(Coords::new(1, 1)).unwrap());
        let editor = sheet.active_editor().unwrap();
        assert_eq!(editor.borrow().value(), "old");
        editor.borrow_mut().set_value("new");
        assert!(sheet.save_edit().unwrap());
        assert!(!sheet.is_editing());
        assert_eq!(sheet.cell_value(Coords::new(1, 1)), "new");

        assert!(sheet.enable_cell_edit(Coords::new(1, 1)).unwrap());
        sheet.active_editor().unwrap().borrow_mut().set_value("discarded");
        assert!(sheet.cancel_edit());
        assert_eq!(sheet.cell_value(Coords::new(1, 1)), "new");
    }

    #[test]
    fn test_copy_and_paste() {
        let mut sheet = sheet(5, 5);
        sheet.set_cell_value(Coords::new(1, 1), "a").unwrap();
        sheet.set_cell_value(Coords::new(2, 2), "b").unwrap();
        sheet.select_block(Block::new(1, 1, 2, 2));
        let copied = sheet.copy_selection();
        assert_eq!(copied.size(), (2, 2));
        assert_eq!(copied.to_text().unwrap(), "a\t\n\tb");

        assert_eq!(sheet.paste_cells(Coords::new(3, 3), &copied).unwrap(), 2);
        assert_eq!(sheet.cell_value(Coords::new(3, 3)), "a");
        assert_eq!(sheet.cell_value(Coords::new(4, 4)), "b");

        // Clipped at the grid edge.
        assert_eq!(sheet.paste_text(Coords::new(4, 4), "x\ty").unwrap(), 1);
        assert_eq!(sheet.cell_value(Coords::new(4, 4)), "x");
    }

    #[test]
    fn test_copy_uses_cursor_without_selection() {
        let mut sheet = sheet(3, 3);
        assert!(sheet.copy_selection().is_empty());
        sheet.set_cell_value(Coords::new(2, 1), "c").unwrap();
        sheet.set_grid_cursor(Coords::new(2, 1)).unwrap();
        assert_eq!(sheet.copy_selection().to_text().unwrap(), "c");
    }

    #[test]
    fn test_paint_draws_labels_and_cells() {
        let mut sheet = sheet(3, 2);
        sheet.set_cell_value(Coords::new(0, 0), "hi").unwrap();
        sheet.select_block(Block::new(1, 1, 1, 1));
        let mut surface = RecordingSurface::new();
        let resources = SheetResources::default();
        sheet
            .paint(&mut surface, &Viewport::new(800, 600), &resources)
            .unwrap();

        let texts = surface.texts();
        for label in ["A", "B", "1", "2", "3", "hi"] {
            assert!(texts.contains(&label), "missing {label}");
        }
        let selected_fill = surface.ops().iter().any(|op| {
            matches!(op, DrawOp::FillRect { rect, colour }
                if *colour == resources.selection_background
                    && *rect == Rect::new(82 + 80, 32 + 25, 80, 25))
        });
        assert!(selected_fill);
        let lines = surface
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count();
        assert_eq!(lines, 5);
    }

    #[test]
    fn test_paint_spanned_cell_once() {
        let sheet = sheet(4, 4);
        sheet.set_cell_span(Coords::new(0, 0), 2, 2).unwrap();
        sheet.data_mut().table_mut().set_value(Coords::new(0, 0), "big").unwrap();
        let mut surface = RecordingSurface::new();
        sheet
            .paint(&mut surface, &Viewport::new(800, 600), &SheetResources::default())
            .unwrap();
        assert_eq!(surface.texts().iter().filter(|t| **t == "big").count(), 1);
        let span_fill = surface.ops().iter().any(|op| {
            matches!(op, DrawOp::FillRect { rect, .. } if *rect == Rect::new(82, 32, 160, 50))
        });
        assert!(span_fill);
    }
}
