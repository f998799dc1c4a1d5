//! Drawing resources shared by every sheet window.
//!
//! A [`SheetResources`] is created once (normally from a [`SheetConfig`]) and
//! passed by reference to painting code. It owns the sizes of fixed widgets
//! and a text-extent cache so repeated measurement of the same label or
//! value does not go back to the surface.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::attr::Font;
use crate::color::Colour;
use crate::config::SheetConfig;

use super::surface::Surface;

const TEXT_EXTENT_CACHE_SIZE: usize = 4096;

/// Insertion-order cache of measured text extents keyed by font and text.
struct TextExtentCache {
    entries: HashMap<Rc<str>, (i32, i32)>,
    order: VecDeque<Rc<str>>,
    max_entries: usize,
    scratch: String,
}

impl TextExtentCache {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
            scratch: String::new(),
        }
    }

    fn get(&mut self, font: &Font, text: &str) -> Option<(i32, i32)> {
        if self.max_entries == 0 {
            return None;
        }
        let key = Self::build_key(&mut self.scratch, font, text);
        self.entries.get(key).copied()
    }

    fn insert(&mut self, font: &Font, text: &str, extent: (i32, i32)) {
        if self.max_entries == 0 {
            return;
        }
        let key = Self::build_key(&mut self.scratch, font, text);
        if self.entries.contains_key(key) {
            return;
        }
        let key_rc: Rc<str> = key.into();
        self.entries.insert(Rc::clone(&key_rc), extent);
        self.order.push_back(key_rc);
        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    fn build_key<'a>(scratch: &'a mut String, font: &Font, text: &str) -> &'a str {
        use std::fmt::Write;
        scratch.clear();
        let _ = write!(
            scratch,
            "{}:{}:{}{}\n{}",
            font.family,
            font.point_size,
            u8::from(font.bold),
            u8::from(font.italic),
            text
        );
        scratch.as_str()
    }
}

/// Process-wide drawing resources.
pub struct SheetResources {
    /// Side of the square drawn by the bool renderer.
    pub checkbox_size: i32,
    /// Width of the clipped-text marker.
    pub overflow_marker_width: i32,
    /// Horizontal gap between cell border and text.
    pub text_margin_x: i32,
    /// Vertical gap between cell border and text.
    pub text_margin_y: i32,
    pub grid_line_colour: Colour,
    pub selection_background: Colour,
    pub selection_foreground: Colour,
    pub label_background: Colour,
    pub label_foreground: Colour,
    text_extents: RefCell<TextExtentCache>,
}

impl Default for SheetResources {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

impl std::fmt::Debug for SheetResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetResources")
            .field("checkbox_size", &self.checkbox_size)
            .field("overflow_marker_width", &self.overflow_marker_width)
            .field("cached_extents", &self.text_extents.borrow().entries.len())
            .finish_non_exhaustive()
    }
}

impl SheetResources {
    pub fn from_config(config: &SheetConfig) -> Self {
        Self {
            checkbox_size: 16,
            overflow_marker_width: 4,
            text_margin_x: 2,
            text_margin_y: 1,
            grid_line_colour: config.colours.grid_lines,
            selection_background: config.colours.selection_background,
            selection_foreground: config.colours.selection_foreground,
            label_background: config.colours.label_background,
            label_foreground: config.colours.label_foreground,
            text_extents: RefCell::new(TextExtentCache::new(TEXT_EXTENT_CACHE_SIZE)),
        }
    }

    /// Measure `text`, consulting the cache first.
    pub fn text_extent(&self, surface: &dyn Surface, text: &str, font: &Font) -> (i32, i32) {
        let mut cache = self.text_extents.borrow_mut();
        if let Some(extent) = cache.get(font, text) {
            return extent;
        }
        let extent = surface.text_extent(text, font);
        cache.insert(font, text, extent);
        extent
    }

    pub fn cached_extent_count(&self) -> usize {
        self.text_extents.borrow().entries.len()
    }

    pub fn clear_cache(&self) {
        let mut cache = self.text_extents.borrow_mut();
        cache.entries.clear();
        cache.order.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    #[test]
    fn test_text_extent_is_cached() {
        let resources = SheetResources::default();
        let surface = RecordingSurface::new();
        let font = Font::default();
        let first = resources.text_extent(&surface, "hello", &font);
        let second = resources.text_extent(&surface, "hello", &font);
        assert_eq!(first, second);
        assert_eq!(resources.cached_extent_count(), 1);
        resources.text_extent(&surface, "hello", &font.clone().bold());
        assert_eq!(resources.cached_extent_count(), 2);
        resources.clear_cache();
        assert_eq!(resources.cached_extent_count(), 0);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = TextExtentCache::new(2);
        let font = Font::default();
        cache.insert(&font, "a", (1, 1));
        cache.insert(&font, "b", (2, 1));
        cache.insert(&font, "c", (3, 1));
        assert_eq!(cache.get(&font, "a"), None);
        assert_eq!(cache.get(&font, "c"), Some((3, 1)));
    }

    #[test]
    fn test_colours_follow_config() {
        let mut config = SheetConfig::default();
        config.colours.grid_lines = Colour::RED;
        let resources = SheetResources::from_config(&config);
        assert_eq!(resources.grid_line_colour, Colour::RED);
    }
}
