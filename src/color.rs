//! RGB colours for cell attributes and drawing.
//!
//! Colours serialize as `#RRGGBB` strings so they read naturally in config
//! files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SheetError;

/// Opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0, 0, 0);
    pub const WHITE: Colour = Colour::new(255, 255, 255);
    pub const RED: Colour = Colour::new(255, 0, 0);
    pub const GREEN: Colour = Colour::new(0, 128, 0);
    pub const BLUE: Colour = Colour::new(0, 0, 255);
    pub const LIGHT_GREY: Colour = Colour::new(211, 211, 211);
    /// Default label background.
    pub const LABEL_FACE: Colour = Colour::new(240, 240, 240);
    /// Default selection highlight.
    pub const SELECTION: Colour = Colour::new(51, 153, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// `#RRGGBB`, upper case.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Blend toward white; 0.0 is unchanged, 1.0 is white.
    #[must_use]
    pub fn lighten(self, factor: f64) -> Self {
        Self {
            r: blend(self.r, 255, factor),
            g: blend(self.g, 255, factor),
            b: blend(self.b, 255, factor),
        }
    }

    /// Blend toward black; 0.0 is unchanged, 1.0 is black.
    #[must_use]
    pub fn darken(self, factor: f64) -> Self {
        Self {
            r: blend(self.r, 0, factor),
            g: blend(self.g, 0, factor),
            b: blend(self.b, 0, factor),
        }
    }

    /// Relative luminance in 0.0..=1.0 (0.299 R + 0.587 G + 0.114 B).
    pub fn luminance(self) -> f64 {
        let r = f64::from(self.r);
        let g = f64::from(self.g);
        let b = f64::from(self.b);
        (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
    }

    pub fn is_light(self) -> bool {
        self.luminance() > 0.5
    }

    /// Black or white, whichever reads better on top of `self`.
    pub fn contrasting_text(self) -> Self {
        if self.is_light() {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

// The value is clamped to [0, 255] before the cast.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(from: u8, to: u8, factor: f64) -> u8 {
    let factor = factor.clamp(0.0, 1.0);
    let from = f64::from(from);
    let to = f64::from(to);
    (from + (to - from) * factor).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Colour {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| SheetError::InvalidParameter(format!("bad colour '{s}'")))
    }
}

impl TryFrom<String> for Colour {
    type Error = SheetError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Colour> for String {
    fn from(c: Colour) -> Self {
        c.to_hex()
    }
}
