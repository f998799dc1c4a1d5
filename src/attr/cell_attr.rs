//! Shared, chainable cell attribute handle.
//!
//! A [`CellAttr`] is either *uncreated* (no backing data) or a reference to
//! shared backing data. Cloning a handle shares the data: a change made
//! through one handle is seen through every clone, which is how an area's
//! default attr propagates live to every attr chained onto it. Use
//! [`CellAttr::copy`] for an independent instance.
//!
//! Every property is optional. A getter returns the local value if set,
//! otherwise the first value found walking the default-attr chain.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

use crate::color::Colour;
use crate::editor::CellEditor;
use crate::error::{Result, SheetError};
use crate::render::CellRenderer;

use super::types::{Alignment, AttrKind, AttrLevel, Font, HAlign, Orientation, VAlign};

/// Renderer shared between every attr that uses it.
pub type SharedRenderer = Rc<dyn CellRenderer>;

/// Editor shared between every attr that uses it; editing mutates it.
pub type SharedEditor = Rc<RefCell<Box<dyn CellEditor>>>;

/// Wrap a renderer for installation in an attr.
pub fn share_renderer(renderer: impl CellRenderer + 'static) -> SharedRenderer {
    Rc::new(renderer)
}

/// Wrap an editor for installation in an attr.
pub fn share_editor(editor: impl CellEditor + 'static) -> SharedEditor {
    Rc::new(RefCell::new(Box::new(editor)))
}

#[derive(Clone, Default)]
struct CellAttrData {
    foreground: Option<Colour>,
    background: Option<Colour>,
    font: Option<Font>,
    h_align: Option<HAlign>,
    v_align: Option<VAlign>,
    orientation: Option<Orientation>,
    read_only: Option<bool>,
    overflow: Option<bool>,
    overflow_marker: Option<bool>,
    show_editor: Option<bool>,
    level: Option<AttrLevel>,
    renderer: Option<SharedRenderer>,
    editor: Option<SharedEditor>,
    kind: Option<AttrKind>,
    default_attr: CellAttr,
}

impl CellAttrData {
    // Every property field except kind and the default chain.
    fn is_complete(&self) -> bool {
        self.foreground.is_some()
            && self.background.is_some()
            && self.font.is_some()
            && self.h_align.is_some()
            && self.v_align.is_some()
            && self.orientation.is_some()
            && self.read_only.is_some()
            && self.overflow.is_some()
            && self.overflow_marker.is_some()
            && self.show_editor.is_some()
            && self.level.is_some()
            && self.renderer.is_some()
            && self.editor.is_some()
    }

    // Take each property `other` has set, unless `overwrite` is false and
    // it is already set here.
    fn zip_fields(&mut self, other: &CellAttrData, overwrite: bool) {
        fn pick<T: Clone>(mine: &mut Option<T>, theirs: &Option<T>, overwrite: bool) {
            if theirs.is_some() && (overwrite || mine.is_none()) {
                mine.clone_from(theirs);
            }
        }
        pick(&mut self.foreground, &other.foreground, overwrite);
        pick(&mut self.background, &other.background, overwrite);
        pick(&mut self.font, &other.font, overwrite);
        pick(&mut self.h_align, &other.h_align, overwrite);
        pick(&mut self.v_align, &other.v_align, overwrite);
        pick(&mut self.orientation, &other.orientation, overwrite);
        pick(&mut self.read_only, &other.read_only, overwrite);
        pick(&mut self.overflow, &other.overflow, overwrite);
        pick(&mut self.overflow_marker, &other.overflow_marker, overwrite);
        pick(&mut self.show_editor, &other.show_editor, overwrite);
        pick(&mut self.level, &other.level, overwrite);
        pick(&mut self.renderer, &other.renderer, overwrite);
        pick(&mut self.editor, &other.editor, overwrite);
    }
}

/// Reference-counted attribute handle; see the module docs.
#[derive(Clone, Default)]
pub struct CellAttr {
    data: Option<Rc<RefCell<CellAttrData>>>,
}

macro_rules! attr_property {
    ($(#[$doc:meta])* $get:ident, $set:ident, $has:ident, $field:ident, $ty:ty, $fallback:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> $ty {
            self.resolve(stringify!($field), |d| d.$field.clone())
                .unwrap_or_else(|| $fallback)
        }

        pub fn $set(&self, value: $ty) {
            self.modify(stringify!($field), |d| d.$field = Some(value));
        }

        /// True if set locally, ignoring the default chain.
        pub fn $has(&self) -> bool {
            self.with_data(|d| d.$field.is_some()).unwrap_or(false)
        }
    };
}

impl CellAttr {
    /// A created attr with every property unset.
    pub fn new() -> Self {
        Self {
            data: Some(Rc::new(RefCell::new(CellAttrData::default()))),
        }
    }

    /// An uncreated handle; same as `CellAttr::default()`.
    pub fn null() -> Self {
        Self::default()
    }

    /// Allocate fresh, unset backing data for this handle. Other handles
    /// that shared the previous data keep it.
    pub fn create(&mut self) {
        *self = Self::new();
    }

    /// Drop this handle's reference to its data.
    pub fn destroy(&mut self) {
        self.data = None;
    }

    pub fn is_ok(&self) -> bool {
        self.data.is_some()
    }

    /// True if both handles share the same backing data.
    pub fn ptr_eq(&self, other: &CellAttr) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Independent deep copy, including renderer, editor and the whole
    /// default chain.
    pub fn copy(&self) -> CellAttr {
        let Some(rc) = &self.data else {
            return CellAttr::null();
        };
        let mut data = rc.borrow().clone();
        data.renderer = data.renderer.map(|r| Rc::from(r.clone_box()));
        data.editor = data.editor.map(|e| {
            let cloned = e.borrow().clone_box();
            Rc::new(RefCell::new(cloned))
        });
        data.default_attr = data.default_attr.copy();
        CellAttr {
            data: Some(Rc::new(RefCell::new(data))),
        }
    }

    /// New attr holding this attr's locally set properties and sharing its
    /// default chain, renderer and editor.
    pub(crate) fn shallow_copy(&self) -> CellAttr {
        match &self.data {
            Some(rc) => {
                let mut data = rc.borrow().clone();
                data.kind = None;
                CellAttr {
                    data: Some(Rc::new(RefCell::new(data))),
                }
            }
            None => CellAttr::null(),
        }
    }

    /// Overwrite local properties with every property `other` has set.
    pub fn update_with(&self, other: &CellAttr) -> Result<()> {
        self.combine_from(other, true)
    }

    /// Fill only the properties unset here from those `other` has set.
    pub fn merge_with(&self, other: &CellAttr) -> Result<()> {
        self.combine_from(other, false)
    }

    fn combine_from(&self, other: &CellAttr, overwrite: bool) -> Result<()> {
        let Some(mine) = &self.data else {
            return Err(SheetError::UninitializedAttr);
        };
        let Some(theirs) = &other.data else {
            return Ok(());
        };
        if Rc::ptr_eq(mine, theirs) {
            return Ok(());
        }
        let theirs = theirs.borrow();
        mine.borrow_mut().zip_fields(&theirs, overwrite);
        Ok(())
    }

    /// True when every property is set locally, so the attr can serve as an
    /// area's base default with no fallback.
    pub fn is_complete(&self) -> bool {
        self.with_data(CellAttrData::is_complete).unwrap_or(false)
    }

    attr_property!(foreground, set_foreground, has_foreground, foreground, Colour, Colour::BLACK);
    attr_property!(background, set_background, has_background, background, Colour, Colour::WHITE);
    attr_property!(font, set_font, has_font, font, Font, Font::default());
    attr_property!(
        /// Horizontal text alignment.
        h_align, set_h_align, has_h_align, h_align, HAlign, HAlign::default()
    );
    attr_property!(
        /// Vertical text alignment.
        v_align, set_v_align, has_v_align, v_align, VAlign, VAlign::default()
    );
    attr_property!(orientation, set_orientation, has_orientation, orientation, Orientation, Orientation::default());
    attr_property!(
        /// Whether the cell refuses edits.
        read_only, set_read_only, has_read_only, read_only, bool, false
    );
    attr_property!(
        /// Whether text may spill into empty neighbouring cells.
        overflow, set_overflow, has_overflow, overflow, bool, false
    );
    attr_property!(
        /// Whether clipped text shows a marker at the cell's right edge.
        overflow_marker, set_overflow_marker, has_overflow_marker, overflow_marker, bool, false
    );
    attr_property!(
        /// Whether the editor stays visible while the cell is current.
        show_editor, set_show_editor, has_show_editor, show_editor, bool, false
    );

    /// Both alignment axes.
    pub fn alignment(&self) -> Alignment {
        Alignment::new(self.h_align(), self.v_align())
    }

    pub fn set_alignment(&self, alignment: Alignment) {
        self.set_h_align(alignment.horizontal);
        self.set_v_align(alignment.vertical);
    }

    pub fn has_alignment(&self) -> bool {
        self.has_h_align() && self.has_v_align()
    }

    /// Merge priority. Local only: the chain is not consulted.
    pub fn level(&self) -> AttrLevel {
        self.with_data(|d| d.level).flatten().unwrap_or_default()
    }

    pub fn set_level(&self, level: AttrLevel) {
        self.modify("level", |d| d.level = Some(level));
    }

    pub fn has_level(&self) -> bool {
        self.with_data(|d| d.level.is_some()).unwrap_or(false)
    }

    /// Store this attr came from. Local only; defaults to `Cell`.
    pub fn kind(&self) -> AttrKind {
        self.with_data(|d| d.kind)
            .flatten()
            .unwrap_or(AttrKind::Cell)
    }

    pub fn set_kind(&self, kind: AttrKind) {
        self.modify("kind", |d| d.kind = Some(kind));
    }

    pub fn renderer(&self) -> Option<SharedRenderer> {
        self.resolve("renderer", |d| d.renderer.clone())
    }

    pub fn set_renderer(&self, renderer: SharedRenderer) {
        self.modify("renderer", |d| d.renderer = Some(renderer));
    }

    pub fn has_renderer(&self) -> bool {
        self.with_data(|d| d.renderer.is_some()).unwrap_or(false)
    }

    pub fn editor(&self) -> Option<SharedEditor> {
        self.resolve("editor", |d| d.editor.clone())
    }

    pub fn set_editor(&self, editor: SharedEditor) {
        self.modify("editor", |d| d.editor = Some(editor));
    }

    pub fn has_editor(&self) -> bool {
        self.with_data(|d| d.editor.is_some()).unwrap_or(false)
    }

    /// The next attr in the chain; uncreated if there is none.
    pub fn default_attr(&self) -> CellAttr {
        self.with_data(|d| d.default_attr.clone())
            .unwrap_or_default()
    }

    pub fn has_default_attr(&self) -> bool {
        self.with_data(|d| d.default_attr.is_ok()).unwrap_or(false)
    }

    /// Chain `default` behind this attr. Passing an uncreated attr removes
    /// the chain. Fails without changing anything if `default` already
    /// leads back to this attr.
    pub fn set_default_attr(&self, default: &CellAttr) -> Result<()> {
        let Some(mine) = &self.data else {
            return Err(SheetError::UninitializedAttr);
        };
        let mut walk = default.clone();
        while let Some(rc) = walk.data.clone() {
            if Rc::ptr_eq(&rc, mine) {
                error!(target: "sheet::attr", "rejected default attr that would form a cycle");
                return Err(SheetError::CyclicDefaultAttr);
            }
            walk = rc.borrow().default_attr.clone();
        }
        mine.borrow_mut().default_attr = default.clone();
        Ok(())
    }

    /// Last attr of the chain starting here (possibly `self`).
    pub fn chain_tail(&self) -> CellAttr {
        let mut tail = self.clone();
        loop {
            let next = tail.default_attr();
            if !next.is_ok() {
                return tail;
            }
            tail = next;
        }
    }

    /// Number of attrs in the chain starting here.
    pub fn chain_len(&self) -> usize {
        let mut len = 0;
        let mut walk = self.clone();
        while walk.is_ok() {
            len += 1;
            walk = walk.default_attr();
        }
        len
    }

    fn with_data<R>(&self, f: impl FnOnce(&CellAttrData) -> R) -> Option<R> {
        self.data.as_ref().map(|rc| f(&rc.borrow()))
    }

    fn modify(&self, what: &'static str, f: impl FnOnce(&mut CellAttrData)) {
        match &self.data {
            Some(rc) => f(&mut rc.borrow_mut()),
            None => debug!(target: "sheet::attr", what, "set on uninitialized attr ignored"),
        }
    }

    fn resolve<T>(&self, what: &'static str, f: impl Fn(&CellAttrData) -> Option<T>) -> Option<T> {
        let Some(first) = self.data.clone() else {
            debug!(target: "sheet::attr", what, "read from uninitialized attr");
            return None;
        };
        let mut current = Some(first);
        while let Some(rc) = current {
            let next = {
                let data = rc.borrow();
                if let Some(value) = f(&data) {
                    return Some(value);
                }
                data.default_attr.data.clone()
            };
            current = next;
        }
        error!(target: "sheet::attr", what, "no value in attr or its default chain");
        None
    }
}

impl fmt::Debug for CellAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(rc) = &self.data else {
            return f.write_str("CellAttr(null)");
        };
        let d = rc.borrow();
        f.debug_struct("CellAttr")
            .field("foreground", &d.foreground)
            .field("background", &d.background)
            .field("font", &d.font)
            .field("h_align", &d.h_align)
            .field("v_align", &d.v_align)
            .field("read_only", &d.read_only)
            .field("level", &d.level)
            .field("kind", &d.kind)
            .field("renderer", &d.renderer.as_ref().map(|r| r.name()))
            .field("editor", &d.editor.as_ref().map(|e| e.borrow().name()))
            .field("chained", &d.default_attr.is_ok())
            .finish()
    }
}
