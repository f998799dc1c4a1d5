use serde::{Deserialize, Serialize};

/// Text font description. Rendering surfaces map this onto whatever font
/// machinery they have.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Font {
    pub family: String,
    pub point_size: i32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            point_size: 10,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

impl Font {
    pub fn new(family: impl Into<String>, point_size: i32) -> Self {
        Self {
            family: family.into(),
            point_size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    #[default]
    Left,
    Centre,
    Right,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    #[default]
    Centre,
    Bottom,
}

/// Resolved alignment on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Alignment {
    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Text direction.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Priority used when cell, row and column attrs all apply to one cell.
/// Higher levels win; an attr without an explicit level counts as `Middle`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttrLevel {
    Bottom,
    #[default]
    Middle,
    Top,
}

/// Which store an attr belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    /// An area's complete base attr.
    Default,
    Cell,
    Row,
    Col,
    /// Lookup: the merged result of every attr that applies. Merged attrs
    /// carry this kind and are not meant to be stored back.
    Any,
}

impl std::fmt::Display for AttrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttrKind::Default => "default",
            AttrKind::Cell => "cell",
            AttrKind::Row => "row",
            AttrKind::Col => "col",
            AttrKind::Any => "any",
        };
        f.write_str(name)
    }
}
