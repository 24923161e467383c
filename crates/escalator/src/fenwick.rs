//! Prefix sums of pixel extents.
//!
//! [`FenwickTree`] keeps the running offsets of a sequence of extents (column
//! widths, spacer heights) so that "where does item `i` start" and "which
//! item covers offset `y`" are both logarithmic, and changing one extent does
//! not touch the others. Structural edits (insert or remove items) rebuild the
//! tree in linear time.
//!
//! Extents are whole pixels in practice, so the sums stay exact in `f64`.

/// Binary indexed tree over non-negative `f64` extents.
///
/// `nodes[k]` (1-based) holds the sum of the `k & -k` extents ending at
/// item `k - 1`; `nodes[0]` is padding.
#[derive(Debug, Clone)]
pub struct FenwickTree {
    nodes: Vec<f64>,
}

impl Default for FenwickTree {
    fn default() -> Self {
        Self { nodes: vec![0.0] }
    }
}

impl FenwickTree {
    #[must_use]
    pub fn from_values(extents: &[f64]) -> Self {
        let mut tree = Self::default();
        tree.rebuild(extents);
        tree
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the contents with `extents`.
    pub fn rebuild(&mut self, extents: &[f64]) {
        self.nodes.clear();
        self.nodes.push(0.0);
        self.nodes.extend_from_slice(extents);
        let len = self.len();
        for k in 1..=len {
            let up = k + low_bit(k);
            if up <= len {
                self.nodes[up] += self.nodes[k];
            }
        }
    }

    /// Add `delta` to item `item`. Out-of-range items are ignored.
    pub fn add(&mut self, item: usize, delta: f64) {
        let len = self.len();
        let mut k = item + 1;
        while k <= len {
            self.nodes[k] += delta;
            k += low_bit(k);
        }
    }

    /// Overwrite the extent of `item`.
    pub fn set(&mut self, item: usize, extent: f64) {
        if item < self.len() {
            let delta = extent - self.extent(item);
            self.add(item, delta);
        }
    }

    /// Extent of `item` (`0.0` past the end).
    #[must_use]
    pub fn extent(&self, item: usize) -> f64 {
        self.sum_before(item + 1) - self.sum_before(item)
    }

    /// Sum of the first `count` extents, i.e. the start offset of item
    /// `count`. Counts past the end are clamped.
    #[must_use]
    pub fn sum_before(&self, count: usize) -> f64 {
        let mut k = count.min(self.len());
        let mut sum = 0.0;
        while k > 0 {
            sum += self.nodes[k];
            k -= low_bit(k);
        }
        sum
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.sum_before(self.len())
    }

    /// Last item whose end offset is `<= offset`, or `None` if even the first
    /// item ends past it.
    ///
    /// The item covering `offset` is therefore `find_prefix(offset).map_or(0,
    /// |i| i + 1)`; zero-width items are skipped over.
    #[must_use]
    pub fn find_prefix(&self, offset: f64) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let mut at = 0;
        let mut left = offset;
        let mut step = 1 << (usize::BITS - 1 - len.leading_zeros());
        while step > 0 {
            let next = at + step;
            if next <= len && self.nodes[next] <= left {
                left -= self.nodes[next];
                at = next;
            }
            step >>= 1;
        }
        at.checked_sub(1)
    }
}

fn low_bit(k: usize) -> usize {
    k & k.wrapping_neg()
}
