//! Sheet configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! usable sheet. Colours are written as `"#RRGGBB"` strings.
//!
//! ```toml
//! default_row_height = 22
//! selection_mode = "rows"
//!
//! [colours]
//! grid_lines = "#C0C0C0"
//!
//! [font]
//! family = "Mono"
//! point_size = 9
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::attr::Font;
use crate::color::Colour;
use crate::error::Result;
use crate::selection::SelectionMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourConfig {
    pub grid_lines: Colour,
    pub label_background: Colour,
    pub label_foreground: Colour,
    pub selection_background: Colour,
    pub selection_foreground: Colour,
    pub cell_background: Colour,
    pub cell_foreground: Colour,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            grid_lines: Colour::LIGHT_GREY,
            label_background: Colour::LABEL_FACE,
            label_foreground: Colour::BLACK,
            selection_background: Colour::SELECTION,
            selection_foreground: Colour::WHITE,
            cell_background: Colour::WHITE,
            cell_foreground: Colour::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub default_row_height: i32,
    pub default_col_width: i32,
    pub min_row_height: i32,
    pub min_col_width: i32,
    pub row_label_width: i32,
    pub col_label_height: i32,
    pub selection_mode: SelectionMode,
    pub colours: ColourConfig,
    pub font: Font,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            default_row_height: 25,
            default_col_width: 80,
            min_row_height: 15,
            min_col_width: 15,
            row_label_width: 82,
            col_label_height: 32,
            selection_mode: SelectionMode::Cells,
            colours: ColourConfig::default(),
            font: Font::default(),
        }
    }
}

impl SheetConfig {
    /// Parse TOML text. Sizes are then normalised, see [`SheetConfig::normalize`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: SheetConfig = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Load from `path`. A missing file gives the defaults; a file that
    /// exists but does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "sheet::config", path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        match Self::from_toml_str(&content) {
            Ok(config) => {
                debug!(target: "sheet::config", path = %path.display(), "config loaded");
                Ok(config)
            }
            Err(e) => {
                warn!(target: "sheet::config", path = %path.display(), error = %e, "config parse failed");
                Err(e)
            }
        }
    }

    /// Keep sizes usable: minimums are at least 1 and defaults are never
    /// below their minimum. Label sizes may be 0, which hides the labels.
    pub fn normalize(&mut self) {
        self.min_row_height = self.min_row_height.max(1);
        self.min_col_width = self.min_col_width.max(1);
        if self.default_row_height < self.min_row_height {
            info!(
                target: "sheet::config",
                raw = self.default_row_height,
                clamped = self.min_row_height,
                "default_row_height_clamped"
            );
            self.default_row_height = self.min_row_height;
        }
        if self.default_col_width < self.min_col_width {
            info!(
                target: "sheet::config",
                raw = self.default_col_width,
                clamped = self.min_col_width,
                "default_col_width_clamped"
            );
            self.default_col_width = self.min_col_width;
        }
        self.row_label_width = self.row_label_width.max(0);
        self.col_label_height = self.col_label_height.max(0);
    }
}
