//! Rectangular cell regions and the block algebra used by selections and
//! spanned cells.
//!
//! A [`Block`] is a top-left corner plus an extent. A block with a height or
//! width below 1 is empty. All combining operations are pure except
//! [`Block::combine`] and the `update_*` shifters, which mutate in place.

use std::fmt;
use std::ops::BitOr;

use crate::coords::Coords;

/// Axis-aligned rectangle of cells: `bottom = row + height - 1`,
/// `right = col + width - 1`.
///
/// Ordering is by top-left corner (row, then col), then by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Block {
    pub row: i32,
    pub col: i32,
    pub height: i32,
    pub width: i32,
}

/// Set of block sides, returned by [`Block::side_matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockSides(u8);

impl BlockSides {
    pub const NONE: Self = Self(0);
    pub const TOP: Self = Self(0b0001);
    pub const BOTTOM: Self = Self(0b0010);
    pub const LEFT: Self = Self(0b0100);
    pub const RIGHT: Self = Self(0b1000);
    pub const ALL: Self = Self(0b1111);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of sides in the set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for BlockSides {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Up to four rectangular pieces left over after splitting one block by
/// another. `left` and `right` span only the rows of the overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Remainder {
    pub top: Option<Block>,
    pub bottom: Option<Block>,
    pub left: Option<Block>,
    pub right: Option<Block>,
}

impl Remainder {
    /// Which pieces are present.
    pub fn sides(&self) -> BlockSides {
        let mut sides = BlockSides::NONE;
        if self.top.is_some() {
            sides = sides | BlockSides::TOP;
        }
        if self.bottom.is_some() {
            sides = sides | BlockSides::BOTTOM;
        }
        if self.left.is_some() {
            sides = sides | BlockSides::LEFT;
        }
        if self.right.is_some() {
            sides = sides | BlockSides::RIGHT;
        }
        sides
    }

    /// The pieces that are present, in top, bottom, left, right order.
    pub fn blocks(&self) -> impl Iterator<Item = Block> {
        [self.top, self.bottom, self.left, self.right]
            .into_iter()
            .flatten()
    }
}

/// Outcome of splitting one block against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// The blocks do not intersect; nothing is split.
    Disjoint,
    /// The block being split is fully covered; nothing remains.
    Covered,
    /// Partial overlap, with the leftover pieces.
    Partial(Remainder),
}

impl Block {
    pub const fn new(row: i32, col: i32, height: i32, width: i32) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    /// Block covering both corners, whatever their order.
    pub fn from_corners(a: Coords, b: Coords) -> Self {
        let top = a.row.min(b.row);
        let left = a.col.min(b.col);
        let bottom = a.row.max(b.row);
        let right = a.col.max(b.col);
        Self::new(top, left, bottom - top + 1, right - left + 1)
    }

    /// One-cell block.
    pub const fn cell(coords: Coords) -> Self {
        Self::new(coords.row, coords.col, 1, 1)
    }

    pub const fn top(&self) -> i32 {
        self.row
    }

    pub const fn left(&self) -> i32 {
        self.col
    }

    pub const fn bottom(&self) -> i32 {
        self.row + self.height - 1
    }

    pub const fn right(&self) -> i32 {
        self.col + self.width - 1
    }

    pub const fn top_left(&self) -> Coords {
        Coords::new(self.row, self.col)
    }

    pub const fn bottom_right(&self) -> Coords {
        Coords::new(self.bottom(), self.right())
    }

    pub const fn top_right(&self) -> Coords {
        Coords::new(self.row, self.right())
    }

    pub const fn bottom_left(&self) -> Coords {
        Coords::new(self.bottom(), self.col)
    }

    pub const fn is_empty(&self) -> bool {
        self.height < 1 || self.width < 1
    }

    pub const fn is_one_cell(&self) -> bool {
        self.height == 1 && self.width == 1
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.height) * i64::from(self.width)
        }
    }

    /// Reposition the block from its top-left and bottom-right corners.
    pub fn set_corners(&mut self, top: i32, left: i32, bottom: i32, right: i32) {
        self.row = top;
        self.col = left;
        self.height = bottom - top + 1;
        self.width = right - left + 1;
    }

    #[must_use]
    pub const fn shifted(&self, rows: i32, cols: i32) -> Self {
        Self::new(self.row + rows, self.col + cols, self.height, self.width)
    }

    pub fn contains_cell(&self, row: i32, col: i32) -> bool {
        !self.is_empty()
            && row >= self.top()
            && row <= self.bottom()
            && col >= self.left()
            && col <= self.right()
    }

    pub fn contains(&self, coords: Coords) -> bool {
        self.contains_cell(coords.row, coords.col)
    }

    /// True if every cell of `other` is inside `self`. Empty blocks are
    /// never contained.
    pub fn contains_block(&self, other: &Block) -> bool {
        !other.is_empty()
            && self.contains_cell(other.top(), other.left())
            && self.contains_cell(other.bottom(), other.right())
    }

    pub fn intersects(&self, other: &Block) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    /// True if the blocks intersect or share an edge or corner.
    pub fn touches(&self, other: &Block) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() <= other.right() + 1
            && self.right() + 1 >= other.left()
            && self.top() <= other.bottom() + 1
            && self.bottom() + 1 >= other.top()
    }

    /// The overlapping region; empty when the blocks do not intersect.
    #[must_use]
    pub fn intersect(&self, other: &Block) -> Block {
        if !self.intersects(other) {
            return Block::default();
        }
        let mut out = Block::default();
        out.set_corners(
            self.top().max(other.top()),
            self.left().max(other.left()),
            self.bottom().min(other.bottom()),
            self.right().min(other.right()),
        );
        out
    }

    /// Bounding block of both. Empty inputs are not special-cased; see
    /// [`Block::expand_union`].
    #[must_use]
    pub fn union(&self, other: &Block) -> Block {
        let mut out = Block::default();
        out.set_corners(
            self.top().min(other.top()),
            self.left().min(other.left()),
            self.bottom().max(other.bottom()),
            self.right().max(other.right()),
        );
        out
    }

    /// Bounding block of both, ignoring whichever one is empty.
    #[must_use]
    pub fn expand_union(&self, other: &Block) -> Block {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Block::default(),
            (true, false) => *other,
            (false, true) => *self,
            (false, false) => self.union(other),
        }
    }

    /// Which edges of `self` lie exactly on the same line as the
    /// corresponding edge of `other`.
    pub fn side_matches(&self, other: &Block) -> BlockSides {
        let mut sides = BlockSides::NONE;
        if self.top() == other.top() {
            sides = sides | BlockSides::TOP;
        }
        if self.bottom() == other.bottom() {
            sides = sides | BlockSides::BOTTOM;
        }
        if self.left() == other.left() {
            sides = sides | BlockSides::LEFT;
        }
        if self.right() == other.right() {
            sides = sides | BlockSides::RIGHT;
        }
        sides
    }

    /// Absorb `other` if the two together form a rectangle.
    ///
    /// Returns false and leaves `self` unchanged otherwise. Absorbing a block
    /// already contained in `self` succeeds without changing `self`.
    pub fn combine(&mut self, other: &Block) -> bool {
        if !self.touches(other) {
            return false;
        }
        if self.contains_block(other) {
            return true;
        }
        if other.contains_block(self) {
            *self = *other;
            return true;
        }

        let sides = self.side_matches(other);
        let same_cols = sides.contains(BlockSides::LEFT | BlockSides::RIGHT);
        let same_rows = sides.contains(BlockSides::TOP | BlockSides::BOTTOM);
        // touches() already guarantees overlap-or-adjacency on both axes, but a
        // diagonal neighbour shares only a corner and must not merge.
        let rows_meet = self.top() <= other.bottom() + 1 && other.top() <= self.bottom() + 1;
        let cols_meet = self.left() <= other.right() + 1 && other.left() <= self.right() + 1;

        if (same_cols && rows_meet) || (same_rows && cols_meet) {
            *self = self.union(other);
            return true;
        }
        false
    }

    /// Pieces of `other` that lie outside `self`.
    ///
    /// Adding these pieces to a set that already holds `self` adds exactly
    /// the uncovered part of `other`.
    pub fn combine_parts(&self, other: &Block) -> Overlap {
        let overlap = self.intersect(other);
        if overlap.is_empty() {
            return Overlap::Disjoint;
        }
        if self.contains_block(other) {
            return Overlap::Covered;
        }

        let mut rem = Remainder::default();
        if other.top() < self.top() {
            let mut b = Block::default();
            b.set_corners(other.top(), other.left(), self.top() - 1, other.right());
            rem.top = Some(b);
        }
        if other.bottom() > self.bottom() {
            let mut b = Block::default();
            b.set_corners(self.bottom() + 1, other.left(), other.bottom(), other.right());
            rem.bottom = Some(b);
        }
        if other.left() < self.left() {
            let mut b = Block::default();
            b.set_corners(overlap.top(), other.left(), overlap.bottom(), self.left() - 1);
            rem.left = Some(b);
        }
        if other.right() > self.right() {
            let mut b = Block::default();
            b.set_corners(overlap.top(), self.right() + 1, overlap.bottom(), other.right());
            rem.right = Some(b);
        }
        Overlap::Partial(rem)
    }

    /// Pieces of `self` left after removing the cells covered by `other`.
    pub fn delete(&self, other: &Block) -> Overlap {
        let overlap = self.intersect(other);
        if overlap.is_empty() {
            return Overlap::Disjoint;
        }
        if other.contains_block(self) {
            return Overlap::Covered;
        }

        let mut rem = Remainder::default();
        if self.top() < overlap.top() {
            let mut b = Block::default();
            b.set_corners(self.top(), self.left(), overlap.top() - 1, self.right());
            rem.top = Some(b);
        }
        if self.bottom() > overlap.bottom() {
            let mut b = Block::default();
            b.set_corners(overlap.bottom() + 1, self.left(), self.bottom(), self.right());
            rem.bottom = Some(b);
        }
        if self.left() < overlap.left() {
            let mut b = Block::default();
            b.set_corners(overlap.top(), self.left(), overlap.bottom(), overlap.left() - 1);
            rem.left = Some(b);
        }
        if self.right() > overlap.right() {
            let mut b = Block::default();
            b.set_corners(overlap.top(), overlap.right() + 1, overlap.bottom(), self.right());
            rem.right = Some(b);
        }
        Overlap::Partial(rem)
    }

    /// Shift for `num` rows inserted (`num > 0`) or deleted (`num < 0`) at
    /// `pos`. Returns true if the block changed. A block lying wholly inside
    /// a deleted range becomes empty.
    pub fn update_rows(&mut self, pos: i32, num: i32) -> bool {
        match shift_span(self.row, self.height, pos, num) {
            Some((start, len)) => {
                self.row = start;
                self.height = len;
                true
            }
            None => false,
        }
    }

    /// Column counterpart of [`Block::update_rows`].
    pub fn update_cols(&mut self, pos: i32, num: i32) -> bool {
        match shift_span(self.col, self.width, pos, num) {
            Some((start, len)) => {
                self.col = start;
                self.width = len;
                true
            }
            None => false,
        }
    }

    /// All coords of the block, row-major.
    pub fn iter(&self) -> impl Iterator<Item = Coords> {
        let (top, left, bottom, right) = (self.top(), self.left(), self.bottom(), self.right());
        let rows = if self.is_empty() { 0..0 } else { top..bottom + 1 };
        rows.flat_map(move |row| (left..=right).map(move |col| Coords::new(row, col)))
    }
}

/// Shift the 1-D span `[start, start + len)` for an insertion/deletion of
/// `num` entries at `pos`. `None` when the span is unaffected.
fn shift_span(start: i32, len: i32, pos: i32, num: i32) -> Option<(i32, i32)> {
    if num == 0 || len < 1 {
        return None;
    }
    let end = start + len - 1;
    if end < pos {
        return None;
    }

    if num > 0 {
        let new_start = if start >= pos { start + num } else { start };
        return Some((new_start, end + num - new_start + 1));
    }

    let deleted = -num;
    let del_end = pos + deleted; // exclusive
    let new_start = if start >= del_end {
        start - deleted
    } else if start >= pos {
        pos
    } else {
        start
    };
    let new_end = if end >= del_end { end - deleted } else { pos - 1 };
    Some((new_start, (new_end - new_start + 1).max(0)))
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}x{}]",
            self.row, self.col, self.height, self.width
        )
    }
}
