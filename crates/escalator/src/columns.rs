//! Column configuration state.
//!
//! One [`Columns`] value is shared by the header, body and footer. It owns
//! the defined and resolved width of every column, the frozen column count
//! and a [`FenwickTree`] of resolved widths for left-edge lookups. Lifecycle
//! work (attaching and detaching cells) is driven by the Escalator; this
//! module only does the bookkeeping.

use escalator_core::IndexRange;
use escalator_core::config::DEFAULT_COLUMN_WIDTH;

use crate::fenwick::FenwickTree;

/// Defined width of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Whole pixels.
    Fixed(f64),
    /// Measured from the widest materialized cell.
    Auto,
}

impl ColumnWidth {
    /// `Fixed(px)` rounded down to whole pixels.
    #[must_use]
    pub fn px(px: f64) -> Self {
        Self::Fixed(px.floor())
    }
}

impl Default for ColumnWidth {
    fn default() -> Self {
        Self::Fixed(DEFAULT_COLUMN_WIDTH)
    }
}

/// Materialized columns: every frozen column plus a contiguous window of
/// unfrozen ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet {
    pub frozen: usize,
    pub window: IndexRange,
}

impl ColumnSet {
    #[must_use]
    pub fn contains(&self, column: usize) -> bool {
        column < self.frozen || self.window.contains(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frozen + self.window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..self.frozen).chain(self.window.iter())
    }
}

/// Width and frozen-count bookkeeping for all columns.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    defined: Vec<ColumnWidth>,
    actual: Vec<f64>,
    offsets: FenwickTree,
    frozen: usize,
}

impl Columns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.defined.len()
    }

    #[must_use]
    pub fn frozen_count(&self) -> usize {
        self.frozen
    }

    #[must_use]
    pub fn width(&self, column: usize) -> Option<ColumnWidth> {
        self.defined.get(column).copied()
    }

    #[must_use]
    pub fn actual(&self, column: usize) -> Option<f64> {
        self.actual.get(column).copied()
    }

    /// Left edge of `column` in table coordinates; `left(count)` is the total
    /// width.
    #[must_use]
    pub fn left(&self, column: usize) -> f64 {
        self.offsets.sum_before(column)
    }

    #[must_use]
    pub fn total_width(&self) -> f64 {
        self.offsets.total()
    }

    /// Combined width of the frozen columns.
    #[must_use]
    pub fn frozen_width(&self) -> f64 {
        self.left(self.frozen)
    }

    /// Index of the column covering table offset `x` (clamped to the last
    /// column). `None` when there are no columns.
    #[must_use]
    pub fn column_at(&self, x: f64) -> Option<usize> {
        if self.defined.is_empty() {
            return None;
        }
        let covering = self.offsets.find_prefix(x).map_or(0, |i| i + 1);
        Some(covering.min(self.defined.len() - 1))
    }

    /// Number of columns whose left edge is strictly before `x`.
    #[must_use]
    pub fn count_starting_before(&self, x: f64) -> usize {
        let n = self.defined.len();
        let mut lo = 0;
        let mut hi = n;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.left(mid) < x {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Unfrozen columns whose span intersects `[x0, x1)` in table
    /// coordinates.
    #[must_use]
    pub fn unfrozen_intersecting(&self, x0: f64, x1: f64) -> IndexRange {
        if x1 <= x0 {
            return IndexRange::new(self.frozen, self.frozen);
        }
        // Columns ending at or before x0 are skipped.
        let first = self
            .offsets
            .find_prefix(x0)
            .map_or(0, |i| i + 1)
            .max(self.frozen);
        let end = self.count_starting_before(x1).max(first);
        IndexRange::new(first, end)
    }

    pub(crate) fn insert(&mut self, offset: usize, count: usize) {
        let widths = std::iter::repeat_n(ColumnWidth::default(), count);
        self.defined.splice(offset..offset, widths);
        self.actual
            .splice(offset..offset, std::iter::repeat_n(DEFAULT_COLUMN_WIDTH, count));
        if offset < self.frozen {
            self.frozen += count;
        }
        self.offsets.rebuild(&self.actual);
    }

    pub(crate) fn remove(&mut self, offset: usize, count: usize) {
        let end = offset + count;
        self.defined.drain(offset..end);
        self.actual.drain(offset..end);
        if end <= self.frozen {
            self.frozen -= count;
        } else if offset < self.frozen {
            self.frozen = offset;
        }
        self.offsets.rebuild(&self.actual);
    }

    pub(crate) fn set_frozen(&mut self, count: usize) {
        self.frozen = count;
    }

    pub(crate) fn set_defined(&mut self, column: usize, width: ColumnWidth) {
        self.defined[column] = width;
    }

    /// Set the resolved width; returns whether it changed.
    pub(crate) fn set_actual(&mut self, column: usize, px: f64) -> bool {
        if self.actual[column] == px {
            return false;
        }
        self.actual[column] = px;
        self.offsets.set(column, px);
        true
    }

    /// Columns defined as `Auto`, ascending.
    pub(crate) fn auto_columns(&self) -> Vec<usize> {
        self.defined
            .iter()
            .enumerate()
            .filter(|(_, width)| matches!(width, ColumnWidth::Auto))
            .map(|(column, _)| column)
            .collect()
    }
}
