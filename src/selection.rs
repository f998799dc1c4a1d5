//! Multi-block selection.
//!
//! A [`Selection`] is a set of cells stored as rectangular [`Block`]s rather
//! than one entry per cell. Under the default [`SelectionPolicy::Combine`]
//! policy the blocks never overlap: selecting a block adds only the pieces
//! not yet covered, and [`Selection::minimize`] merges neighbours that line
//! up into larger rectangles. [`SelectionPolicy::Multiple`] keeps every block
//! as given, which is what spanned cells need.
//!
//! Blocks are kept sorted by top-left corner so coordinate lookups only scan
//! the blocks starting at or above the row in question.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::block::{Block, Overlap};
use crate::coords::Coords;

/// What a click or drag selects in a sheet window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Individual cells.
    #[default]
    Cells,
    /// Whole rows only.
    Rows,
    /// Whole columns only.
    Cols,
}

impl SelectionMode {
    /// Widen `block` to whole rows or columns of a `rows` x `cols` grid.
    pub fn expand(self, block: Block, rows: i32, cols: i32) -> Block {
        match self {
            SelectionMode::Cells => block,
            SelectionMode::Rows => Block::new(block.row, 0, block.height, cols),
            SelectionMode::Cols => Block::new(0, block.col, rows, block.width),
        }
    }
}

/// How added blocks interact with those already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Blocks are kept disjoint and can be merged by `minimize`.
    #[default]
    Combine,
    /// Blocks are stored exactly as added and never merged.
    Multiple,
}

/// Sorted collection of blocks plus their bounding block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    blocks: Vec<Block>,
    bounds: Block,
    policy: SelectionPolicy,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn from_block(block: Block) -> Self {
        let mut sel = Self::new();
        sel.select_block(block, true);
        sel
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn has_selection(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<Block> {
        self.blocks.get(index).copied()
    }

    /// Smallest block containing every selected cell; empty when nothing is
    /// selected.
    pub fn bounding_block(&self) -> Block {
        self.bounds
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.bounds = Block::default();
    }

    /// Number of cells selected. Overlapping blocks under the `Multiple`
    /// policy are counted once per block.
    pub fn cell_count(&self) -> i64 {
        self.blocks.iter().map(Block::cell_count).sum()
    }

    /// Number of leading blocks whose top row is at or above `row`. Only
    /// these can contain a cell of `row`.
    pub fn find_top_row(&self, row: i32) -> usize {
        self.blocks.partition_point(|b| b.top() <= row)
    }

    /// Index of the first block containing the cell.
    pub fn index(&self, coords: Coords) -> Option<usize> {
        if !self.bounds.contains(coords) {
            return None;
        }
        let end = self.find_top_row(coords.row);
        self.blocks
            .get(..end)?
            .iter()
            .position(|b| b.contains(coords))
    }

    /// Index of the first block that wholly contains `block`.
    pub fn index_block(&self, block: &Block) -> Option<usize> {
        if !self.bounds.contains_block(block) {
            return None;
        }
        let end = self.find_top_row(block.top());
        self.blocks
            .get(..end)?
            .iter()
            .position(|b| b.contains_block(block))
    }

    /// Index of the first block that intersects `block`.
    pub fn index_intersects(&self, block: &Block) -> Option<usize> {
        if !self.bounds.intersects(block) {
            return None;
        }
        let end = self.find_top_row(block.bottom());
        self.blocks
            .get(..end)?
            .iter()
            .position(|b| b.intersects(block))
    }

    pub fn contains_cell(&self, row: i32, col: i32) -> bool {
        self.index(Coords::new(row, col)).is_some()
    }

    pub fn contains(&self, coords: Coords) -> bool {
        self.index(coords).is_some()
    }

    /// True if every cell of `block` is selected, even when the cells are
    /// spread over several blocks.
    pub fn contains_block(&self, block: &Block) -> bool {
        if block.is_empty() || !self.bounds.contains_block(block) {
            return false;
        }
        let mut uncovered = vec![*block];
        for sel in &self.blocks {
            uncovered = uncovered
                .into_iter()
                .flat_map(|piece| match sel.combine_parts(&piece) {
                    Overlap::Disjoint => vec![piece],
                    Overlap::Covered => Vec::new(),
                    Overlap::Partial(rem) => rem.blocks().collect(),
                })
                .collect();
            if uncovered.is_empty() {
                return true;
            }
        }
        false
    }

    /// Add `block`, returning the pieces that were not already selected.
    ///
    /// With `combine_now` false the selection is left unminimized so a run
    /// of additions (e.g. a mouse drag) can be merged once at the end with
    /// [`Selection::minimize`].
    pub fn select_block(&mut self, block: Block, combine_now: bool) -> Vec<Block> {
        if block.is_empty() {
            return Vec::new();
        }
        if self.policy == SelectionPolicy::Multiple {
            self.insert_sorted(block);
            self.bounds = self.bounds.expand_union(&block);
            return vec![block];
        }

        let mut pending = vec![block];
        if self.bounds.intersects(&block) {
            for existing in self.blocks.iter().filter(|b| b.intersects(&block)) {
                pending = pending
                    .into_iter()
                    .flat_map(|piece| match existing.combine_parts(&piece) {
                        Overlap::Disjoint => vec![piece],
                        Overlap::Covered => Vec::new(),
                        Overlap::Partial(rem) => rem.blocks().collect(),
                    })
                    .collect();
                if pending.is_empty() {
                    break;
                }
            }
        }

        for piece in &pending {
            self.insert_sorted(*piece);
            self.bounds = self.bounds.expand_union(piece);
        }
        trace!(target: "sheet::selection", %block, added = pending.len(), "select_block");

        if combine_now {
            self.minimize();
        }
        pending
    }

    /// Remove `block`, returning the pieces that were actually deselected.
    pub fn deselect_block(&mut self, block: Block, combine_now: bool) -> Vec<Block> {
        if block.is_empty() || !self.bounds.intersects(&block) {
            return Vec::new();
        }

        let mut deleted = Vec::new();
        let mut kept = Vec::with_capacity(self.blocks.len());
        for existing in self.blocks.drain(..) {
            match existing.delete(&block) {
                Overlap::Disjoint => kept.push(existing),
                Overlap::Covered => deleted.push(existing),
                Overlap::Partial(rem) => {
                    deleted.push(existing.intersect(&block));
                    kept.extend(rem.blocks());
                }
            }
        }
        kept.sort();
        self.blocks = kept;
        self.recompute_bounds();
        trace!(target: "sheet::selection", %block, removed = deleted.len(), "deselect_block");

        if combine_now {
            self.minimize();
        }
        deleted
    }

    /// Remove and return every block that intersects `block`, without
    /// splitting any of them.
    pub fn remove_intersecting(&mut self, block: &Block) -> Vec<Block> {
        let (removed, kept): (Vec<Block>, Vec<Block>) =
            self.blocks.drain(..).partition(|b| b.intersects(block));
        self.blocks = kept;
        if !removed.is_empty() {
            self.recompute_bounds();
        }
        removed
    }

    /// Merge blocks that together form larger rectangles until no pair can
    /// be combined. Returns true if the block count dropped.
    pub fn minimize(&mut self) -> bool {
        if self.policy == SelectionPolicy::Multiple || self.blocks.len() < 2 {
            return false;
        }
        let before = self.blocks.len();
        let mut blocks = std::mem::take(&mut self.blocks);
        loop {
            let mut merged_any = false;
            let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
            for block in blocks {
                let mut absorbed = false;
                for target in &mut out {
                    if target.combine(&block) {
                        absorbed = true;
                        break;
                    }
                }
                if absorbed {
                    merged_any = true;
                } else {
                    out.push(block);
                }
            }
            blocks = out;
            if !merged_any {
                break;
            }
        }
        blocks.sort();
        self.blocks = blocks;
        trace!(target: "sheet::selection", before, after = self.blocks.len(), "minimize");
        self.blocks.len() < before
    }

    /// Shift for `num` rows inserted (`> 0`) or deleted (`< 0`) at `pos`.
    /// Blocks wholly inside a deleted range are dropped.
    pub fn update_rows(&mut self, pos: i32, num: i32) -> bool {
        self.update_with(|b| b.update_rows(pos, num))
    }

    /// Column counterpart of [`Selection::update_rows`].
    pub fn update_cols(&mut self, pos: i32, num: i32) -> bool {
        self.update_with(|b| b.update_cols(pos, num))
    }

    fn update_with(&mut self, mut f: impl FnMut(&mut Block) -> bool) -> bool {
        let mut changed = false;
        for block in &mut self.blocks {
            changed |= f(block);
        }
        if changed {
            self.blocks.retain(|b| !b.is_empty());
            self.blocks.sort();
            self.recompute_bounds();
        }
        changed
    }

    fn insert_sorted(&mut self, block: Block) {
        let at = self.blocks.partition_point(|b| *b < block);
        self.blocks.insert(at, block);
    }

    fn recompute_bounds(&mut self) {
        self.bounds = self
            .blocks
            .iter()
            .fold(Block::default(), |acc, b| acc.expand_union(b));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn all_cells(rows: i32, cols: i32) -> impl Iterator<Item = Coords> {
        Block::new(0, 0, rows, cols).iter()
    }

    fn assert_disjoint(sel: &Selection) {
        for (i, a) in sel.blocks().iter().enumerate() {
            for b in sel.blocks().iter().skip(i + 1) {
                assert!(!a.intersects(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_selection_mode_expand() {
        let block = Block::new(2, 3, 1, 2);
        assert_eq!(SelectionMode::Cells.expand(block, 10, 6), block);
        assert_eq!(SelectionMode::Rows.expand(block, 10, 6), Block::new(2, 0, 1, 6));
        assert_eq!(SelectionMode::Cols.expand(block, 10, 6), Block::new(0, 3, 10, 2));
    }

    #[test]
    fn test_adjacent_blocks_minimize_to_one() {
        let mut sel = Selection::new();
        sel.select_block(Block::new(0, 0, 2, 2), false);
        sel.select_block(Block::new(0, 2, 2, 2), false);
        assert_eq!(sel.len(), 2);
        assert!(sel.minimize());
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.block(0), Some(Block::new(0, 0, 2, 4)));
    }

    #[test]
    fn test_select_overlapping_adds_only_new_cells() {
        let mut sel = Selection::new();
        sel.select_block(Block::new(0, 0, 3, 3), true);
        let added = sel.select_block(Block::new(1, 1, 3, 3), false);
        let added_cells: i64 = added.iter().map(Block::cell_count).sum();
        assert_eq!(added_cells, 9 - 4);
        assert_disjoint(&sel);
        assert_eq!(sel.cell_count(), 14);
        assert_eq!(sel.bounding_block(), Block::new(0, 0, 4, 4));
    }

    #[test]
    fn test_select_twice_is_idempotent() {
        let b = Block::new(2, 1, 3, 4);
        let mut once = Selection::new();
        once.select_block(b, true);
        let mut twice = once.clone();
        let added = twice.select_block(b, true);
        assert!(added.is_empty());
        for c in all_cells(8, 8) {
            assert_eq!(once.contains(c), twice.contains(c), "{c}");
        }
    }

    #[test]
    fn test_select_then_deselect_is_empty() {
        let b = Block::new(1, 1, 4, 4);
        let mut sel = Selection::new();
        sel.select_block(b, true);
        let removed = sel.deselect_block(b, true);
        assert_eq!(removed, vec![b]);
        assert!(sel.is_empty());
        assert!(sel.bounding_block().is_empty());
    }

    #[test]
    fn test_deselect_hole() {
        let mut sel = Selection::from_block(Block::new(0, 0, 3, 3));
        let removed = sel.deselect_block(Block::new(1, 1, 1, 1), true);
        assert_eq!(removed, vec![Block::new(1, 1, 1, 1)]);
        assert!(!sel.contains(Coords::new(1, 1)));
        assert_eq!(sel.cell_count(), 8);
        assert_disjoint(&sel);
        for c in all_cells(3, 3).filter(|c| *c != Coords::new(1, 1)) {
            assert!(sel.contains(c), "{c}");
        }
    }

    #[test]
    fn test_contains_block_across_pieces() {
        let mut sel = Selection::new();
        sel.select_block(Block::new(0, 0, 2, 2), false);
        sel.select_block(Block::new(2, 0, 2, 1), false);
        assert!(sel.contains_block(&Block::new(0, 0, 4, 1)));
        assert!(!sel.contains_block(&Block::new(0, 0, 4, 2)));
        assert_eq!(sel.index_block(&Block::new(0, 0, 4, 1)), None);
        assert_eq!(sel.index_block(&Block::new(1, 1, 1, 1)), Some(0));
    }

    #[test]
    fn test_index_uses_sorted_blocks() {
        let mut sel = Selection::new();
        sel.select_block(Block::new(10, 0, 1, 1), false);
        sel.select_block(Block::new(0, 5, 1, 1), false);
        sel.select_block(Block::new(5, 2, 2, 2), false);
        assert_eq!(sel.blocks()[0], Block::new(0, 5, 1, 1));
        assert_eq!(sel.find_top_row(5), 2);
        assert_eq!(sel.index(Coords::new(6, 3)), Some(1));
        assert_eq!(sel.index(Coords::new(6, 4)), None);
        assert_eq!(sel.index_intersects(&Block::new(9, 0, 5, 5)), Some(2));
    }

    #[test]
    fn test_drag_batch_then_minimize() {
        let mut sel = Selection::new();
        for row in 0..5 {
            for col in 0..4 {
                sel.select_block(Block::new(row, col, 1, 1), false);
            }
        }
        assert_eq!(sel.len(), 20);
        sel.minimize();
        assert_eq!(sel.blocks(), &[Block::new(0, 0, 5, 4)]);
    }

    #[test]
    fn test_update_rows_round_trip() {
        let mut sel = Selection::new();
        sel.select_block(Block::new(0, 0, 2, 2), true);
        sel.select_block(Block::new(5, 1, 2, 3), true);
        let before = sel.clone();

        assert!(sel.update_rows(3, 4));
        assert!(sel.contains(Coords::new(9, 1)));
        assert!(!sel.contains(Coords::new(5, 1)));
        assert!(sel.update_rows(3, -4));
        for c in all_cells(12, 6) {
            assert_eq!(sel.contains(c), before.contains(c), "{c}");
        }
    }

    #[test]
    fn test_update_rows_drops_deleted_blocks() {
        let mut sel = Selection::new();
        sel.select_block(Block::new(2, 0, 2, 2), true);
        sel.select_block(Block::new(8, 0, 1, 1), true);
        sel.update_rows(1, -4);
        assert_eq!(sel.blocks(), &[Block::new(4, 0, 1, 1)]);
        assert_eq!(sel.bounding_block(), Block::new(4, 0, 1, 1));
    }

    #[test]
    fn test_update_cols() {
        let mut sel = Selection::from_block(Block::new(0, 3, 1, 2));
        sel.update_cols(0, 2);
        assert_eq!(sel.blocks(), &[Block::new(0, 5, 1, 2)]);
    }

    #[test]
    fn test_multiple_policy_keeps_blocks() {
        let mut sel = Selection::with_policy(SelectionPolicy::Multiple);
        sel.select_block(Block::new(0, 0, 2, 2), true);
        sel.select_block(Block::new(0, 2, 2, 2), true);
        assert_eq!(sel.len(), 2);
        assert!(!sel.minimize());

        let removed = sel.remove_intersecting(&Block::new(1, 1, 1, 1));
        assert_eq!(removed, vec![Block::new(0, 0, 2, 2)]);
        assert_eq!(sel.bounding_block(), Block::new(0, 2, 2, 2));
    }
}
