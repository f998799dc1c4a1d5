//! Pixel extents for a sequence of rows or columns.
//!
//! [`ArrayEdge`] stores, for each index, the inclusive pixel offset of its
//! trailing edge. While every entry has the default size the backing array
//! stays empty and offsets are computed on the fly, so a million default
//! rows cost nothing. The array is materialized on the first non-default
//! size and dropped again once every entry is back to the default.
//!
//! Offsets saturate at `i32::MAX`; entries past that point report the
//! saturated extent instead of wrapping.

use tracing::trace;

use crate::error::{Result, SheetError};
use crate::pair_array::PairArray;

/// Cumulative row heights or column widths.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEdge {
    count: i32,
    default_size: i32,
    min_allowed_size: i32,
    /// `data[i]` is the last pixel of index `i`; empty when all default.
    data: Vec<i32>,
    /// Per-index minimums above `min_allowed_size`.
    min_sizes: PairArray<i32, i32>,
}

impl ArrayEdge {
    pub fn new(count: i32, default_size: i32, min_allowed_size: i32) -> Self {
        let min_allowed_size = min_allowed_size.max(0);
        Self {
            count: count.max(0),
            default_size: default_size.max(min_allowed_size),
            min_allowed_size,
            data: Vec::new(),
            min_sizes: PairArray::new(),
        }
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn default_size(&self) -> i32 {
        self.default_size
    }

    pub fn min_allowed_size(&self) -> i32 {
        self.min_allowed_size
    }

    /// True while no entry differs from the default size.
    pub fn is_implicit(&self) -> bool {
        self.data.is_empty()
    }

    /// First pixel of `index`. Indices past the end start at the total extent.
    pub fn get_min(&self, index: i32) -> i32 {
        if index <= 0 {
            return 0;
        }
        self.edge(index.min(self.count) - 1).saturating_add(1)
    }

    /// Last pixel of `index` (`get_min(index) - 1` for a zero-size entry).
    pub fn get_max(&self, index: i32) -> i32 {
        if index < 0 || index >= self.count {
            return self.get_min(index) - 1;
        }
        self.edge(index)
    }

    /// Size of `index`; 0 outside `0..count`.
    pub fn get_size(&self, index: i32) -> i32 {
        self.get_max(index)
            .saturating_sub(self.get_min(index))
            .saturating_add(1)
    }

    /// Sum of all sizes.
    pub fn total(&self) -> i32 {
        self.get_min(self.count)
    }

    fn edge(&self, index: i32) -> i32 {
        if self.data.is_empty() {
            return (index + 1).saturating_mul(self.default_size).saturating_sub(1);
        }
        usize::try_from(index)
            .ok()
            .and_then(|i| self.data.get(i))
            .copied()
            .unwrap_or(-1)
    }

    /// Minimum size allowed for `index`.
    pub fn min_size(&self, index: i32) -> i32 {
        self.min_sizes
            .get(index)
            .copied()
            .unwrap_or(self.min_allowed_size)
            .max(self.min_allowed_size)
    }

    /// Raise the minimum for a single index. Values at or below the global
    /// minimum clear the override.
    pub fn set_min_size(&mut self, index: i32, size: i32) -> Result<()> {
        self.check_index(index)?;
        if size <= self.min_allowed_size {
            self.min_sizes.remove_value(index);
        } else {
            self.min_sizes.set_value(index, size);
        }
        Ok(())
    }

    /// Set the global minimum. With `resize_existing`, visible entries below
    /// the new minimum are enlarged to it.
    pub fn set_min_allowed_size(&mut self, size: i32, resize_existing: bool) {
        self.min_allowed_size = size.max(0);
        self.min_sizes.retain(|_, &min| min > size);
        if self.default_size < self.min_allowed_size {
            self.set_default_size(self.min_allowed_size, false);
        }
        if resize_existing && !self.data.is_empty() {
            for index in 0..self.count {
                let current = self.get_size(index);
                if current > 0 && current < self.min_size(index) {
                    self.apply_size(index, self.min_size(index));
                }
            }
            self.check_minimize();
        }
    }

    /// Change the default size. With `resize_existing` every entry is reset
    /// to it, otherwise existing entries keep their current sizes.
    pub fn set_default_size(&mut self, size: i32, resize_existing: bool) {
        let size = size.max(self.min_allowed_size);
        if resize_existing {
            self.data.clear();
        } else {
            self.materialize();
        }
        self.default_size = size;
        self.check_minimize();
    }

    /// Set the size of `index`. A size of 0 hides the entry; positive sizes
    /// are raised to the entry's minimum.
    pub fn set_size(&mut self, index: i32, size: i32) -> Result<()> {
        self.check_index(index)?;
        let size = if size <= 0 {
            0
        } else {
            size.max(self.min_size(index))
        };
        if size == self.get_size(index) {
            return Ok(());
        }
        self.materialize();
        self.apply_size(index, size);
        self.check_minimize();
        Ok(())
    }

    // Requires a materialized array.
    fn apply_size(&mut self, index: i32, size: i32) {
        let delta = size - self.get_size(index);
        let start = usize::try_from(index).unwrap_or(usize::MAX);
        for edge in self.data.iter_mut().skip(start) {
            *edge = edge.saturating_add(delta);
        }
    }

    /// Index whose extent contains pixel `coord`.
    ///
    /// Out-of-range pixels give the first/last index when `clip` is set,
    /// `None` otherwise. Zero-size entries are never returned for an
    /// in-range pixel.
    pub fn find_index(&self, coord: i32, clip: bool) -> Option<i32> {
        if self.count == 0 {
            return None;
        }
        if coord < 0 {
            return clip.then_some(0);
        }
        if coord >= self.total() {
            return clip.then_some(self.count - 1);
        }
        if self.data.is_empty() {
            // total() > 0 here, so default_size > 0
            return Some(coord / self.default_size);
        }
        let i = self.data.partition_point(|&edge| edge < coord);
        i32::try_from(i).ok()
    }

    /// Index whose trailing edge lies within `edge_size` pixels of `val`,
    /// for hit-testing resize handles.
    pub fn find_max_edge_index(&self, val: i32, edge_size: i32) -> Option<i32> {
        let index = self.find_index(val, true)?;
        let near = |edge: i32| (i64::from(edge) - i64::from(val)).abs() <= i64::from(edge_size);
        if near(self.get_max(index)) {
            return Some(index);
        }
        if index > 0 && near(self.get_max(index - 1)) {
            return Some(index - 1);
        }
        None
    }

    /// Insert (`num > 0`) default-size entries at `pos`, or remove `-num`
    /// entries starting at `pos`.
    pub fn update_pos(&mut self, pos: i32, num: i32) -> Result<()> {
        if num == 0 {
            return Ok(());
        }
        if pos < 0 || pos > self.count || (num < 0 && pos == self.count) {
            return Err(SheetError::InvalidIndex {
                index: pos,
                count: self.count,
            });
        }

        if num > 0 {
            if !self.data.is_empty() {
                let start = self.get_min(pos);
                let at = usize::try_from(pos).unwrap_or(0);
                let default = self.default_size;
                let inserted =
                    (1..=num).map(|k| start.saturating_add(k.saturating_mul(default)).saturating_sub(1));
                let shift = num.saturating_mul(default);
                let tail: Vec<i32> = self.data.split_off(at);
                self.data.extend(inserted);
                self.data.extend(tail.into_iter().map(|e| e.saturating_add(shift)));
            }
            self.count = self.count.saturating_add(num);
        } else {
            let num = (-num).min(self.count - pos);
            if !self.data.is_empty() {
                let removed = self.get_min(pos + num) - self.get_min(pos);
                let at = usize::try_from(pos).unwrap_or(0);
                let end = usize::try_from(pos + num).unwrap_or(at);
                let tail: Vec<i32> = self.data.split_off(end);
                self.data.truncate(at);
                self.data.extend(tail.into_iter().map(|e| e - removed));
            }
            self.count -= num;
        }
        self.min_sizes.update_pos(pos, num);
        self.check_minimize();
        trace!(target: "sheet::edge", pos, num, count = self.count, "edge_update_pos");
        Ok(())
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.count = 0;
        self.data.clear();
        self.min_sizes.clear();
    }

    /// Drop the backing array if every entry has the default size.
    pub fn check_minimize(&mut self) {
        if self.data.is_empty() {
            return;
        }
        let all_default = (0..self.count).all(|i| self.get_size(i) == self.default_size);
        if all_default {
            trace!(target: "sheet::edge", count = self.count, "edge_minimized");
            self.data.clear();
        }
    }

    fn materialize(&mut self) {
        if !self.data.is_empty() || self.count == 0 {
            return;
        }
        let default = self.default_size;
        self.data = (1..=self.count)
            .map(|i| i.saturating_mul(default).saturating_sub(1))
            .collect();
        trace!(target: "sheet::edge", count = self.count, "edge_materialized");
    }

    fn check_index(&self, index: i32) -> Result<()> {
        if index < 0 || index >= self.count {
            return Err(SheetError::InvalidIndex {
                index,
                count: self.count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn assert_consistent(edge: &ArrayEdge) {
        let mut sum = 0;
        for i in 0..edge.count() {
            assert_eq!(
                edge.get_max(i) - edge.get_min(i) + 1,
                edge.get_size(i),
                "index {i}"
            );
            sum += edge.get_size(i);
        }
        assert_eq!(sum, edge.get_max(edge.count() - 1) + 1);
        assert_eq!(sum, edge.total());
    }

    #[test]
    fn test_implicit_defaults() {
        let edge = ArrayEdge::new(5, 20, 5);
        assert!(edge.is_implicit());
        assert_eq!(edge.get_min(0), 0);
        assert_eq!(edge.get_max(0), 19);
        assert_eq!(edge.get_max(4), 99);
        assert_eq!(edge.total(), 100);
        assert_consistent(&edge);
    }

    #[test]
    fn test_set_size_shifts_following_entries() {
        let mut edge = ArrayEdge::new(5, 20, 5);
        edge.set_size(2, 50).unwrap();
        assert!(!edge.is_implicit());
        assert_eq!(edge.get_min(2), 40);
        assert_eq!(edge.get_max(2), 89);
        assert_eq!(edge.get_min(3), 90);
        assert_eq!(edge.get_max(4), 129);
        assert_consistent(&edge);
    }

    #[test]
    fn test_set_size_back_to_default_minimizes() {
        let mut edge = ArrayEdge::new(5, 20, 5);
        edge.set_size(1, 30).unwrap();
        edge.set_size(1, 20).unwrap();
        assert!(edge.is_implicit());
        assert_eq!(edge.total(), 100);
    }

    #[test]
    fn test_set_size_clamps_to_minimum() {
        let mut edge = ArrayEdge::new(4, 20, 10);
        edge.set_min_size(1, 15).unwrap();
        edge.set_size(0, 3).unwrap();
        edge.set_size(1, 12).unwrap();
        edge.set_size(2, 0).unwrap();
        assert_eq!(edge.get_size(0), 10);
        assert_eq!(edge.get_size(1), 15);
        assert_eq!(edge.get_size(2), 0);
        assert_consistent(&edge);
        assert!(edge.set_size(4, 10).is_err());
    }

    #[test]
    fn test_find_index() {
        let mut edge = ArrayEdge::new(5, 20, 5);
        assert_eq!(edge.find_index(0, false), Some(0));
        assert_eq!(edge.find_index(39, false), Some(1));
        assert_eq!(edge.find_index(40, false), Some(2));
        assert_eq!(edge.find_index(-3, false), None);
        assert_eq!(edge.find_index(-3, true), Some(0));
        assert_eq!(edge.find_index(100, false), None);
        assert_eq!(edge.find_index(100, true), Some(4));

        edge.set_size(2, 50).unwrap();
        edge.set_size(3, 0).unwrap();
        assert_eq!(edge.find_index(89, false), Some(2));
        assert_eq!(edge.find_index(90, false), Some(4));
        for px in 0..edge.total() {
            let i = edge.find_index(px, false).unwrap();
            assert!(edge.get_min(i) <= px && px <= edge.get_max(i), "pixel {px}");
        }
    }

    #[test]
    fn test_find_max_edge_index() {
        let edge = ArrayEdge::new(5, 20, 5);
        assert_eq!(edge.find_max_edge_index(19, 2), Some(0));
        assert_eq!(edge.find_max_edge_index(21, 2), Some(0));
        assert_eq!(edge.find_max_edge_index(30, 2), None);
        assert_eq!(edge.find_max_edge_index(101, 3), Some(4));
    }

    #[test]
    fn test_update_pos_insert() {
        let mut edge = ArrayEdge::new(3, 10, 1);
        edge.set_size(1, 30).unwrap();
        edge.update_pos(1, 2).unwrap();
        assert_eq!(edge.count(), 5);
        assert_eq!(edge.get_size(0), 10);
        assert_eq!(edge.get_size(1), 10);
        assert_eq!(edge.get_size(2), 10);
        assert_eq!(edge.get_size(3), 30);
        assert_eq!(edge.get_size(4), 10);
        assert_consistent(&edge);

        let mut implicit = ArrayEdge::new(3, 10, 1);
        implicit.update_pos(3, 4).unwrap();
        assert!(implicit.is_implicit());
        assert_eq!(implicit.total(), 70);
    }

    #[test]
    fn test_update_pos_delete() {
        let mut edge = ArrayEdge::new(5, 10, 1);
        edge.set_size(1, 25).unwrap();
        edge.set_size(3, 40).unwrap();
        edge.update_pos(1, -2).unwrap();
        assert_eq!(edge.count(), 3);
        assert_eq!(edge.get_size(1), 40);
        assert_consistent(&edge);

        edge.update_pos(1, -5).unwrap();
        assert_eq!(edge.count(), 1);
        assert!(edge.is_implicit());
        assert!(edge.update_pos(4, 1).is_err());
        assert!(edge.update_pos(1, -1).is_err());
    }

    #[test]
    fn test_update_pos_shifts_min_sizes() {
        let mut edge = ArrayEdge::new(5, 20, 5);
        edge.set_min_size(3, 30).unwrap();
        edge.update_pos(0, 2).unwrap();
        assert_eq!(edge.min_size(5), 30);
        assert_eq!(edge.min_size(3), 5);
    }

    #[test]
    fn test_default_size_changes() {
        let mut edge = ArrayEdge::new(3, 10, 1);
        edge.set_size(0, 15).unwrap();
        edge.set_default_size(20, false);
        assert_eq!(edge.get_size(0), 15);
        assert_eq!(edge.get_size(1), 10);

        edge.set_default_size(20, true);
        assert!(edge.is_implicit());
        assert_eq!(edge.total(), 60);
    }

    #[test]
    fn test_min_allowed_resize_existing() {
        let mut edge = ArrayEdge::new(3, 20, 1);
        edge.set_size(0, 4).unwrap();
        edge.set_size(1, 0).unwrap();
        edge.set_min_allowed_size(8, true);
        assert_eq!(edge.get_size(0), 8);
        assert_eq!(edge.get_size(1), 0);
        assert_consistent(&edge);
    }

    #[test]
    fn test_clear() {
        let mut edge = ArrayEdge::new(3, 20, 1);
        edge.set_size(0, 4).unwrap();
        edge.clear();
        assert_eq!(edge.count(), 0);
        assert_eq!(edge.total(), 0);
        assert_eq!(edge.find_index(0, true), None);
    }

    #[test]
    fn test_huge_implicit_edge_saturates() {
        let mut edge = ArrayEdge::new(100_000_000, 25, 1);
        assert_eq!(edge.get_min(1000), 25_000);
        assert_eq!(edge.get_size(1000), 25);
        assert_eq!(edge.get_min(50_000_000), 1_250_000_000);
        assert_eq!(edge.total(), i32::MAX);
        assert_eq!(edge.get_max(edge.count() - 1), i32::MAX);
        assert_eq!(edge.find_index(i32::MAX - 1, false), Some(85_899_345));
        assert_eq!(edge.find_index(i32::MAX, true), Some(edge.count() - 1));
        assert_eq!(edge.find_max_edge_index(i32::MIN, 4), None);

        edge.update_pos(0, 10).unwrap();
        assert_eq!(edge.count(), 100_000_010);
        assert!(edge.is_implicit());
        assert_eq!(edge.total(), i32::MAX);
    }
}
