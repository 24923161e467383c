#![forbid(unsafe_code)]

//! Half-open logical index ranges.

use std::fmt;
use std::ops::Range;

/// A half-open range `start..end` of logical row or column indices.
///
/// Unlike `std::ops::Range` this is `Copy` and always normalized: a range
/// with `end < start` is never constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexRange {
    start: usize,
    end: usize,
}

impl IndexRange {
    /// The empty range at 0.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Range `start..end`; an inverted pair collapses to `start..start`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self { start, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Range `start..start + len`, saturating at `usize::MAX`.
    #[must_use]
    pub const fn with_len(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(len),
        }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Whether `other` lies entirely inside `self`. Empty ranges are
    /// contained in anything.
    #[must_use]
    pub const fn contains_range(&self, other: &Self) -> bool {
        other.is_empty() || (other.start >= self.start && other.end <= self.end)
    }

    /// Overlap of the two ranges (empty if disjoint).
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start >= end {
            Self::new(start, start)
        } else {
            Self { start, end }
        }
    }

    /// Whether the ranges share at least one index.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Grow the range by `before` indices on the left and `after` on the
    /// right, then clip it to `0..limit`.
    #[must_use]
    pub fn expand(&self, before: usize, after: usize, limit: usize) -> Self {
        let start = self.start.saturating_sub(before).min(limit);
        let end = self.end.saturating_add(after).min(limit);
        Self::new(start, end)
    }

    /// Split into the parts before, inside and after `other`.
    #[must_use]
    pub fn partition(&self, other: &Self) -> (Self, Self, Self) {
        let before = Self::new(self.start, other.start.clamp(self.start, self.end));
        let after = Self::new(other.end.clamp(self.start, self.end), self.end);
        (before, self.intersection(other), after)
    }

    /// Translate the range by a signed delta, saturating at 0.
    #[must_use]
    pub fn offset(&self, delta: isize) -> Self {
        let shift = |value: usize| value.saturating_add_signed(delta);
        Self::new(shift(self.start), shift(self.end))
    }

    #[must_use]
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for IndexRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<IndexRange> for Range<usize> {
    fn from(range: IndexRange) -> Self {
        range.start..range.end
    }
}

impl IntoIterator for IndexRange {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
