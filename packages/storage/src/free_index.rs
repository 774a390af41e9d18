use std::collections::BTreeMap;

/// Result of [`FreeIndex::find_space`]: either a reusable offset, or a
/// signal that the caller should append past the current end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    At(u64),
    Eof,
}

/// Ordered map of reclaimed `(offset -> length)` spans, with first-fit
/// allocation and merge-on-free coalescing.
#[derive(Debug, Clone, Default)]
pub struct FreeIndex {
    index: BTreeMap<u64, u64>,
}

impl FreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// First block whose length is at least `size`, scanned in ascending
    /// offset order. Splits the block if larger than needed, reinserting
    /// the remainder. Returns `Placement::Eof` when nothing fits.
    pub fn find_space(&mut self, size: u64) -> Placement {
        let hit = self
            .index
            .iter()
            .find(|(_, &length)| length >= size)
            .map(|(&position, &length)| (position, length));

        let Some((position, length)) = hit else {
            return Placement::Eof;
        };

        self.index.remove(&position);
        if length > size {
            self.index.insert(position + size, length - size);
        }
        Placement::At(position)
    }

    /// Return a freed span to the index, merging with the adjacent block on
    /// either side when they're contiguous.
    pub fn add(&mut self, position: u64, length: u64) {
        if length == 0 {
            return;
        }

        let prev = self
            .index
            .range(..position)
            .next_back()
            .map(|(&p, &l)| (p, l));
        let next = self.index.range(position..).next().map(|(&p, &l)| (p, l));

        let mut merged_position = position;
        let mut merged_length = length;

        if let Some((prev_pos, prev_len)) = prev {
            if prev_pos + prev_len == position {
                self.index.remove(&prev_pos);
                merged_position = prev_pos;
                merged_length = prev_len + length;
            }
        }

        if let Some((next_pos, next_len)) = next {
            if merged_position + merged_length == next_pos {
                self.index.remove(&next_pos);
                merged_length += next_len;
            }
        }

        self.index.insert(merged_position, merged_length);
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Serialize to the side-file shape: `{stringified offset: length}`.
    pub fn to_string_map(&self) -> std::collections::BTreeMap<String, u64> {
        self.index
            .iter()
            .map(|(&pos, &len)| (pos.to_string(), len))
            .collect()
    }

    /// Rebuild from the side-file shape.
    pub fn from_string_map(map: &std::collections::BTreeMap<String, u64>) -> Self {
        let index = map
            .iter()
            .filter_map(|(pos, &len)| pos.parse::<u64>().ok().map(|pos| (pos, len)))
            .collect();
        FreeIndex { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_space_returns_eof_when_empty() {
        let mut fi = FreeIndex::new();
        assert_eq!(fi.find_space(10), Placement::Eof);
    }

    // P2: first-fit allocation, remainder reinserted.
    #[test]
    fn find_space_splits_oversized_block() {
        let mut fi = FreeIndex::new();
        fi.add(100, 50);
        assert_eq!(fi.find_space(20), Placement::At(100));
        assert_eq!(fi.find_space(20), Placement::At(120));
        // 10 bytes left at 140.
        assert_eq!(fi.find_space(11), Placement::Eof);
        assert_eq!(fi.find_space(10), Placement::At(140));
    }

    // P3: adjacent free blocks merge on add, both sides.
    #[test]
    fn add_merges_with_both_neighbors() {
        let mut fi = FreeIndex::new();
        fi.add(0, 10); // [0,10)
        fi.add(20, 10); // [20,30), disjoint
        fi.add(10, 10); // fills the gap: merges with both into [0,30)
        assert_eq!(fi.len(), 1);
        assert_eq!(fi.find_space(30), Placement::At(0));
    }

    #[test]
    fn add_merges_with_left_neighbor_only() {
        let mut fi = FreeIndex::new();
        fi.add(0, 10);
        fi.add(10, 5);
        assert_eq!(fi.len(), 1);
        assert_eq!(fi.find_space(15), Placement::At(0));
    }

    #[test]
    fn add_merges_with_right_neighbor_only() {
        let mut fi = FreeIndex::new();
        fi.add(10, 5);
        fi.add(0, 10);
        assert_eq!(fi.len(), 1);
        assert_eq!(fi.find_space(15), Placement::At(0));
    }

    #[test]
    fn string_map_round_trips() {
        let mut fi = FreeIndex::new();
        fi.add(5, 10);
        fi.add(100, 3);
        let map = fi.to_string_map();
        let restored = FreeIndex::from_string_map(&map);
        assert_eq!(restored.find_space(10), Placement::At(5));
        assert_eq!(restored.find_space(3), Placement::At(100));
    }
}
