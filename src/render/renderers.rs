//! Cell renderers.
//!
//! A renderer turns one cell's value and attr into drawing calls. Renderers
//! are installed on attrs, so whichever attr a cell resolves to decides how
//! it is drawn.

use tracing::warn;

use crate::attr::{CellAttr, Font, HAlign, VAlign};
use crate::color::Colour;
use crate::coords::Coords;
use crate::error::{Result, SheetError};
use crate::layout::Rect;
use crate::table::SheetTable;

use super::resources::SheetResources;
use super::surface::Surface;

/// Everything a renderer needs to draw one cell.
pub struct CellDraw<'a> {
    pub table: &'a dyn SheetTable,
    pub attr: &'a CellAttr,
    pub resources: &'a SheetResources,
    /// Cell bounds on the surface.
    pub rect: Rect,
    pub coords: Coords,
    pub selected: bool,
}

/// Draws cells of one data type.
pub trait CellRenderer {
    fn name(&self) -> &'static str;

    fn draw(&self, surface: &mut dyn Surface, cell: &CellDraw<'_>);

    /// Size the cell would need to show its value in full. `cell.rect` is
    /// ignored.
    fn best_size(&self, surface: &dyn Surface, cell: &CellDraw<'_>) -> (i32, i32);

    /// Configure from a renderer-specific parameter string.
    fn set_parameters(&mut self, _params: &str) -> Result<()> {
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn CellRenderer>;
}

/// Text, background and text colour for a cell, honouring selection.
fn cell_colours(cell: &CellDraw<'_>) -> (Colour, Colour) {
    if cell.selected {
        (
            cell.resources.selection_background,
            cell.resources.selection_foreground,
        )
    } else {
        (cell.attr.background(), cell.attr.foreground())
    }
}

/// Fill the cell background.
pub fn draw_background(surface: &mut dyn Surface, cell: &CellDraw<'_>) {
    let (background, _) = cell_colours(cell);
    surface.fill_rect(cell.rect, background);
}

/// Cut `text` so it fits in `max_width`, by binary search on the number of
/// leading chars kept.
fn fit_text(
    surface: &dyn Surface,
    resources: &SheetResources,
    text: &str,
    font: &Font,
    max_width: i32,
) -> (String, bool) {
    if resources.text_extent(surface, text, font).0 <= max_width {
        return (text.to_string(), false);
    }
    let chars: Vec<char> = text.chars().collect();
    let mut low = 0;
    let mut high = chars.len();
    while low < high {
        let mid = (low + high).div_ceil(2);
        let candidate: String = chars.iter().take(mid).collect();
        if resources.text_extent(surface, &candidate, font).0 <= max_width {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    (chars.iter().take(low).collect(), true)
}

/// Draw `text` inside the cell using the attr's font, colours and
/// alignment. Clipped text gets an overflow marker if the attr asks for one.
pub fn draw_text_in_cell(surface: &mut dyn Surface, cell: &CellDraw<'_>, text: &str) {
    if text.is_empty() || cell.rect.is_empty() {
        return;
    }
    let (_, foreground) = cell_colours(cell);
    let font = cell.attr.font();
    let alignment = cell.attr.alignment();
    let res = cell.resources;

    let inner = cell.rect.deflate(res.text_margin_x, res.text_margin_y);
    let marker = if cell.attr.overflow_marker() {
        res.overflow_marker_width
    } else {
        0
    };
    let (shown, clipped) = fit_text(surface, res, text, &font, inner.width);
    let (shown, clipped) = if clipped && marker > 0 {
        let (again, _) = fit_text(surface, res, text, &font, inner.width - marker);
        (again, true)
    } else {
        (shown, clipped)
    };

    let (width, height) = res.text_extent(surface, &shown, &font);
    let x = match alignment.horizontal {
        HAlign::Left => inner.x,
        HAlign::Centre => inner.x + (inner.width - width) / 2,
        HAlign::Right => inner.x + inner.width - width,
    };
    let y = match alignment.vertical {
        VAlign::Top => inner.y,
        VAlign::Centre => inner.y + (inner.height - height) / 2,
        VAlign::Bottom => inner.y + inner.height - height,
    };

    surface.set_clip(Some(cell.rect));
    surface.draw_text(&shown, x.max(inner.x), y, &font, foreground);
    if clipped && marker > 0 {
        let marker_rect = Rect::new(
            cell.rect.right() - marker,
            cell.rect.y,
            marker,
            cell.rect.height,
        );
        surface.draw_overflow_marker(marker_rect, foreground);
    }
    surface.set_clip(None);
}

fn text_best_size(surface: &dyn Surface, cell: &CellDraw<'_>, text: &str) -> (i32, i32) {
    let res = cell.resources;
    let (w, h) = res.text_extent(surface, text, &cell.attr.font());
    (w + 2 * res.text_margin_x, h + 2 * res.text_margin_y)
}

/// Parse an optional integer parameter; empty means unset.
fn parse_opt<T: std::str::FromStr>(s: &str, params: &str) -> Result<Option<T>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .map_err(|_| SheetError::InvalidParameter(params.to_string()))
}

/// Split `"a,b"` into two optional values.
pub(crate) fn parse_pair<T: std::str::FromStr>(params: &str) -> Result<(Option<T>, Option<T>)> {
    let mut parts = params.splitn(2, ',');
    let first = parse_opt(parts.next().unwrap_or(""), params)?;
    let second = parse_opt(parts.next().unwrap_or(""), params)?;
    Ok((first, second))
}

/// Plain text.
#[derive(Debug, Clone, Default)]
pub struct StringRenderer;

impl CellRenderer for StringRenderer {
    fn name(&self) -> &'static str {
        "string"
    }

    fn draw(&self, surface: &mut dyn Surface, cell: &CellDraw<'_>) {
        draw_background(surface, cell);
        let text = cell.table.value(cell.coords);
        draw_text_in_cell(surface, cell, &text);
    }

    fn best_size(&self, surface: &dyn Surface, cell: &CellDraw<'_>) -> (i32, i32) {
        text_best_size(surface, cell, &cell.table.value(cell.coords))
    }

    fn clone_box(&self) -> Box<dyn CellRenderer> {
        Box::new(self.clone())
    }
}

/// Integers. Values that do not parse are drawn as they are.
#[derive(Debug, Clone, Default)]
pub struct NumberRenderer;

impl NumberRenderer {
    fn text(cell: &CellDraw<'_>) -> String {
        match cell.table.value_as_long(cell.coords) {
            Some(n) => n.to_string(),
            None => cell.table.value(cell.coords),
        }
    }
}

impl CellRenderer for NumberRenderer {
    fn name(&self) -> &'static str {
        "number"
    }

    fn draw(&self, surface: &mut dyn Surface, cell: &CellDraw<'_>) {
        draw_background(surface, cell);
        draw_text_in_cell(surface, cell, &Self::text(cell));
    }

    fn best_size(&self, surface: &dyn Surface, cell: &CellDraw<'_>) -> (i32, i32) {
        text_best_size(surface, cell, &Self::text(cell))
    }

    fn clone_box(&self) -> Box<dyn CellRenderer> {
        Box::new(self.clone())
    }
}

/// Floating point numbers with optional minimum width and fixed precision,
/// configured by a `"width,precision"` string where either part may be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloatRenderer {
    width: Option<usize>,
    precision: Option<usize>,
}

impl FloatRenderer {
    pub fn new(width: Option<usize>, precision: Option<usize>) -> Self {
        Self { width, precision }
    }

    pub fn width(&self) -> Option<usize> {
        self.width
    }

    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    /// Format a value with this renderer's width and precision.
    pub fn format(&self, value: f64) -> String {
        let number = match self.precision {
            Some(p) => format!("{value:.p$}"),
            None => value.to_string(),
        };
        match self.width {
            Some(w) => format!("{number:>w$}"),
            None => number,
        }
    }

    fn text(&self, cell: &CellDraw<'_>) -> String {
        match cell.table.value_as_double(cell.coords) {
            Some(v) => self.format(v),
            None => cell.table.value(cell.coords),
        }
    }
}

impl CellRenderer for FloatRenderer {
    fn name(&self) -> &'static str {
        "float"
    }

    fn draw(&self, surface: &mut dyn Surface, cell: &CellDraw<'_>) {
        draw_background(surface, cell);
        draw_text_in_cell(surface, cell, &self.text(cell));
    }

    fn best_size(&self, surface: &dyn Surface, cell: &CellDraw<'_>) -> (i32, i32) {
        text_best_size(surface, cell, &self.text(cell))
    }

    fn set_parameters(&mut self, params: &str) -> Result<()> {
        if params.trim().is_empty() {
            self.width = None;
            self.precision = None;
            return Ok(());
        }
        match parse_pair(params) {
            Ok((width, precision)) => {
                self.width = width;
                self.precision = precision;
                Ok(())
            }
            Err(e) => {
                warn!(target: "sheet::attr", params, "invalid float renderer parameters");
                Err(e)
            }
        }
    }

    fn clone_box(&self) -> Box<dyn CellRenderer> {
        Box::new(self.clone())
    }
}

/// Check box, placed by the attr's alignment.
#[derive(Debug, Clone, Default)]
pub struct BoolRenderer;

impl CellRenderer for BoolRenderer {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn draw(&self, surface: &mut dyn Surface, cell: &CellDraw<'_>) {
        draw_background(surface, cell);
        let size = cell.resources.checkbox_size;
        let rect = cell.rect;
        let alignment = cell.attr.alignment();
        let x = match alignment.horizontal {
            HAlign::Left => rect.x + cell.resources.text_margin_x,
            HAlign::Centre => rect.x + (rect.width - size) / 2,
            HAlign::Right => rect.right() - cell.resources.text_margin_x - size + 1,
        };
        let y = match alignment.vertical {
            VAlign::Top => rect.y + cell.resources.text_margin_y,
            VAlign::Centre => rect.y + (rect.height - size) / 2,
            VAlign::Bottom => rect.bottom() - cell.resources.text_margin_y - size + 1,
        };
        let checked = cell.table.value_as_bool(cell.coords).unwrap_or(false);
        let (_, foreground) = cell_colours(cell);
        surface.draw_check(Rect::new(x, y, size, size), checked, foreground);
    }

    fn best_size(&self, _surface: &dyn Surface, cell: &CellDraw<'_>) -> (i32, i32) {
        let res = cell.resources;
        (
            res.checkbox_size + 2 * res.text_margin_x,
            res.checkbox_size + 2 * res.text_margin_y,
        )
    }

    fn clone_box(&self) -> Box<dyn CellRenderer> {
        Box::new(self.clone())
    }
}
