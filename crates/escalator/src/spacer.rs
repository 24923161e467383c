//! Spacers: variable-height decorations anchored below body rows.
//!
//! [`SpacerIndex`] keeps the spacers sorted by anchor row with a parallel
//! [`FenwickTree`] of their heights, so the pixel offset contributed by all
//! spacers above a row is a binary search plus a prefix query. Inserting or
//! removing body rows only rewrites anchor keys; the tree is untouched unless
//! a spacer is created or destroyed.

use crate::fenwick::FenwickTree;

/// A spacer below a body row.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacerElement {
    pub(crate) row: usize,
    pub(crate) height: f64,
    pub(crate) content: String,
}

impl SpacerElement {
    pub(crate) fn new(row: usize, height: f64) -> Self {
        Self {
            row,
            height,
            content: String::new(),
        }
    }

    /// Body row the spacer is anchored below.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

/// Sorted spacers with prefix sums over their heights.
#[derive(Debug, Clone, Default)]
pub struct SpacerIndex {
    spacers: Vec<SpacerElement>,
    heights: FenwickTree,
}

impl SpacerIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spacers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spacers.is_empty()
    }

    fn position(&self, row: usize) -> Result<usize, usize> {
        self.spacers.binary_search_by_key(&row, |spacer| spacer.row)
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&SpacerElement> {
        self.position(row).ok().map(|at| &self.spacers[at])
    }

    pub(crate) fn get_mut(&mut self, row: usize) -> Option<&mut SpacerElement> {
        self.position(row).ok().map(|at| &mut self.spacers[at])
    }

    /// Height of the spacer below `row`, or 0.
    #[must_use]
    pub fn height_at(&self, row: usize) -> f64 {
        self.get(row).map_or(0.0, SpacerElement::height)
    }

    /// Spacers in row order.
    pub fn iter(&self) -> impl Iterator<Item = &SpacerElement> {
        self.spacers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SpacerElement> {
        self.spacers.iter_mut()
    }

    /// Sum of the heights of spacers anchored at rows `< row`.
    #[must_use]
    pub fn sum_before(&self, row: usize) -> f64 {
        let count = self.spacers.partition_point(|spacer| spacer.row < row);
        self.heights.sum_before(count)
    }

    /// Sum of all spacer heights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.heights.total()
    }

    /// Insert a new spacer. Returns `false` (and changes nothing) if the row
    /// already has one.
    pub(crate) fn insert(&mut self, spacer: SpacerElement) -> bool {
        match self.position(spacer.row) {
            Ok(_) => false,
            Err(at) => {
                self.spacers.insert(at, spacer);
                self.rebuild();
                true
            }
        }
    }

    /// Change the height of an existing spacer. O(log k).
    pub(crate) fn set_height(&mut self, row: usize, height: f64) -> bool {
        match self.position(row) {
            Ok(at) => {
                self.spacers[at].height = height;
                self.heights.set(at, height);
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn remove(&mut self, row: usize) -> Option<SpacerElement> {
        let at = self.position(row).ok()?;
        let spacer = self.spacers.remove(at);
        self.rebuild();
        Some(spacer)
    }

    /// Rows `offset..` moved down by `count`.
    pub(crate) fn shift_for_insert(&mut self, offset: usize, count: usize) {
        let from = self.spacers.partition_point(|spacer| spacer.row < offset);
        for spacer in &mut self.spacers[from..] {
            spacer.row += count;
        }
    }

    /// Rows `offset..offset + count` were removed: take their spacers out and
    /// move later anchors up.
    pub(crate) fn remove_rows(&mut self, offset: usize, count: usize) -> Vec<SpacerElement> {
        let end = offset + count;
        let from = self.spacers.partition_point(|spacer| spacer.row < offset);
        let to = self.spacers.partition_point(|spacer| spacer.row < end);
        let removed: Vec<SpacerElement> = self.spacers.drain(from..to).collect();
        for spacer in &mut self.spacers[from..] {
            spacer.row -= count;
        }
        if !removed.is_empty() {
            self.rebuild();
        }
        removed
    }

    fn rebuild(&mut self) {
        let heights: Vec<f64> = self.spacers.iter().map(SpacerElement::height).collect();
        self.heights.rebuild(&heights);
    }
}
