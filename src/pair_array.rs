//! Sorted key/value association used for every sparse row, column and cell
//! keyed container in the sheet (attributes, labels, minimum sizes, copied
//! cells).
//!
//! Keys are kept strictly ascending in a `Vec` parallel to the values, so
//! lookups are binary searches and iteration is in key order. Row and
//! column insertion/deletion is applied to the keys in place.

use crate::coords::Coords;

/// Sorted association of `K -> V` with unique keys.
#[derive(Debug, Clone, PartialEq)]
pub struct PairArray<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K, V> Default for PairArray<K, V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<K: Ord + Copy, V> PairArray<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn key_at(&self, index: usize) -> Option<K> {
        self.keys.get(index).copied()
    }

    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.keys.iter().copied().zip(self.values.iter())
    }

    /// Index of `key`, if present.
    pub fn find_index(&self, key: K) -> Option<usize> {
        self.keys.binary_search(&key).ok()
    }

    /// Position at which `key` would be inserted to keep the keys sorted.
    /// For a key already present this is its own index.
    pub fn find_insert_index(&self, key: K) -> usize {
        match self.keys.binary_search(&key) {
            Ok(i) | Err(i) => i,
        }
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.find_index(key).is_some()
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.find_index(key).and_then(|i| self.values.get(i))
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let i = self.find_index(key)?;
        self.values.get_mut(i)
    }

    /// Insert `value` at `key`, overwriting any previous value.
    pub fn set_value(&mut self, key: K, value: V) {
        match self.keys.binary_search(&key) {
            Ok(i) => {
                if let Some(slot) = self.values.get_mut(i) {
                    *slot = value;
                }
            }
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, value);
            }
        }
    }

    /// Mutable access to the value at `key`, inserting `V::default()` first
    /// if the key is absent.
    #[allow(clippy::indexing_slicing)]
    pub fn get_or_create_value(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let i = match self.keys.binary_search(&key) {
            Ok(i) => i,
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, V::default());
                i
            }
        };
        // found or just inserted at i
        &mut self.values[i]
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove_value(&mut self, key: K) -> Option<V> {
        let i = self.find_index(key)?;
        self.keys.remove(i);
        Some(self.values.remove(i))
    }

    /// Remove the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        if index >= self.keys.len() {
            return None;
        }
        Some((self.keys.remove(index), self.values.remove(index)))
    }

    /// Append without keeping the sort order. Call [`PairArray::sort`]
    /// before any lookup.
    pub fn push_unsorted(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Restore the sort order after [`PairArray::push_unsorted`]. When a key
    /// was pushed more than once the last pushed value wins.
    pub fn sort(&mut self) {
        if self.keys.windows(2).all(|w| matches!(w, [a, b] if a < b)) {
            return;
        }
        let keys = std::mem::take(&mut self.keys);
        let values = std::mem::take(&mut self.values);
        let mut pairs: Vec<(usize, K, V)> = keys
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(i, (k, v))| (i, k, v))
            .collect();
        // later pushes sort first within equal keys so dedup keeps them
        pairs.sort_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)));
        for (_, k, v) in pairs {
            if self.keys.last() == Some(&k) {
                continue;
            }
            self.keys.push(k);
            self.values.push(v);
        }
    }

    /// Keep only the entries for which `f` returns true.
    pub fn retain(&mut self, mut f: impl FnMut(K, &V) -> bool) {
        let keys = std::mem::take(&mut self.keys);
        let values = std::mem::take(&mut self.values);
        for (k, v) in keys.into_iter().zip(values) {
            if f(k, &v) {
                self.keys.push(k);
                self.values.push(v);
            }
        }
    }
}

/// Shift one 1-D key for `num` entries inserted/deleted at `pos`. `None`
/// means the key falls inside a deleted range and the entry goes away.
fn shift_key(key: i32, pos: i32, num: i32) -> Option<i32> {
    if key < pos || num == 0 {
        return Some(key);
    }
    if num > 0 {
        return Some(key + num);
    }
    let deleted = -num;
    if key < pos + deleted {
        None
    } else {
        Some(key - deleted)
    }
}

impl<V> PairArray<Coords, V> {
    /// Apply `num` rows inserted (`> 0`) or deleted (`< 0`) at `pos`.
    /// Returns true if any entry moved or was removed.
    pub fn update_rows(&mut self, pos: i32, num: i32) -> bool {
        self.shift_keys(|c| shift_key(c.row, pos, num).map(|row| Coords::new(row, c.col)))
    }

    /// Column counterpart of [`PairArray::update_rows`].
    pub fn update_cols(&mut self, pos: i32, num: i32) -> bool {
        self.shift_keys(|c| shift_key(c.col, pos, num).map(|col| Coords::new(c.row, col)))
    }
}

impl<V> PairArray<i32, V> {
    /// Apply `num` indices inserted (`> 0`) or deleted (`< 0`) at `pos`.
    /// Returns true if any entry moved or was removed.
    pub fn update_pos(&mut self, pos: i32, num: i32) -> bool {
        self.shift_keys(|k| shift_key(k, pos, num))
    }
}

impl<K: Ord + Copy, V> PairArray<K, V> {
    // `f` must be monotone over the surviving keys, which holds for a
    // uniform shift at or after a position.
    fn shift_keys(&mut self, f: impl Fn(K) -> Option<K>) -> bool {
        let mut changed = false;
        let keys = std::mem::take(&mut self.keys);
        let values = std::mem::take(&mut self.values);
        for (k, v) in keys.into_iter().zip(values) {
            match f(k) {
                Some(new_key) => {
                    changed |= new_key != k;
                    self.keys.push(new_key);
                    self.values.push(v);
                }
                None => changed = true,
            }
        }
        changed
    }
}

impl<K: Ord + Copy, V> FromIterator<(K, V)> for PairArray<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.push_unsorted(k, v);
        }
        out.sort();
        out
    }
}
