//! Updater callback protocol.
//!
//! An [`EscalatorUpdater`] decides what goes into a materialized row. The
//! Escalator calls it at fixed lifecycle points:
//!
//! ```text
//! FREE -> pre_attach -> (inserted) -> post_attach -> update ... -> pre_detach
//!      -> (removed) -> post_detach -> FREE
//! ```
//!
//! A pooled row that is rebound to another logical index without leaving the
//! screen only sees `update`. Cells are handed out as [`FlyweightCell`]s that
//! borrow the pooled element for the duration of the call; anything that must
//! outlive the call has to be copied out with [`FlyweightCell::snapshot`].

use std::fmt;

use escalator_core::Section;

use crate::pool::ElementId;

/// Snapshot of a row as seen by an updater callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowInfo {
    pub section: Section,
    /// Logical row index within the section.
    pub index: usize,
    /// Pooled element currently bound to the row.
    pub element: ElementId,
    /// Section-local top edge in pixels (spacers included).
    pub top: f64,
    pub height: f64,
    /// Whether the element is in the visible tree at the time of the call.
    pub attached: bool,
}

/// A pooled cell element.
#[derive(Debug, Clone, PartialEq)]
pub struct CellElement {
    pub(crate) column: usize,
    pub(crate) left: f64,
    pub(crate) width: f64,
    pub(crate) translate_x: f64,
    pub(crate) frozen: bool,
    pub(crate) last_frozen: bool,
    pub(crate) content: String,
}

impl CellElement {
    pub(crate) fn new(column: usize) -> Self {
        Self {
            column,
            left: 0.0,
            width: 0.0,
            translate_x: 0.0,
            frozen: false,
            last_frozen: false,
            content: String::new(),
        }
    }

    /// Logical column the cell is bound to.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Left edge in table coordinates (sum of preceding column widths).
    #[must_use]
    pub fn left(&self) -> f64 {
        self.left
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Horizontal translation applied by scrolling; always 0 for frozen
    /// cells.
    #[must_use]
    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    /// Left edge on screen.
    #[must_use]
    pub fn screen_left(&self) -> f64 {
        self.left + self.translate_x
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether this is the rightmost frozen cell (the clip boundary).
    #[must_use]
    pub fn is_last_frozen(&self) -> bool {
        self.last_frozen
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Borrowed view of one materialized cell, valid only during a callback.
pub struct FlyweightCell<'a> {
    row: usize,
    cell: &'a mut CellElement,
}

impl FlyweightCell<'_> {
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.cell.column
    }

    #[must_use]
    pub fn element(&self) -> &CellElement {
        self.cell
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.cell.content
    }

    /// Replace the cell's text content.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.cell.content = content.into();
    }

    /// Clear the cell's text content, keeping its allocation.
    pub fn clear(&mut self) {
        self.cell.content.clear();
    }

    /// Owned copy of the cell's current state.
    #[must_use]
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            row: self.row,
            column: self.cell.column,
            screen_left: self.cell.screen_left(),
            width: self.cell.width,
            frozen: self.cell.frozen,
            content: self.cell.content.clone(),
        }
    }
}

impl fmt::Debug for FlyweightCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlyweightCell")
            .field("row", &self.row)
            .field("column", &self.cell.column)
            .finish()
    }
}

/// Owned copy of a cell, safe to keep after the callback returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSnapshot {
    pub row: usize,
    pub column: usize,
    pub screen_left: f64,
    pub width: f64,
    pub frozen: bool,
    pub content: String,
}

/// Finite, single-pass iterator over the cells passed to a callback.
///
/// Column mutations restrict the iterator to the affected columns.
pub struct Cells<'a> {
    row: usize,
    inner: std::slice::IterMut<'a, CellElement>,
    only: Option<&'a [usize]>,
}

impl<'a> Cells<'a> {
    pub(crate) fn new(row: usize, cells: &'a mut [CellElement], only: Option<&'a [usize]>) -> Self {
        Self {
            row,
            inner: cells.iter_mut(),
            only,
        }
    }

    /// Logical row the cells belong to.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Columns the remaining iteration will yield, without consuming it.
    #[must_use]
    pub fn columns(&self) -> Vec<usize> {
        self.inner
            .as_slice()
            .iter()
            .map(|cell| cell.column)
            .filter(|column| self.only.is_none_or(|only| only.binary_search(column).is_ok()))
            .collect()
    }
}

impl<'a> Iterator for Cells<'a> {
    type Item = FlyweightCell<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cell = self.inner.next()?;
            if self
                .only
                .is_none_or(|columns| columns.binary_search(&cell.column).is_ok())
            {
                return Some(FlyweightCell {
                    row: self.row,
                    cell,
                });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.only {
            None => self.inner.size_hint(),
            Some(_) => (0, self.inner.size_hint().1),
        }
    }
}

/// Populates and depopulates materialized rows.
///
/// Every hook has an empty default body so implementors only write the phases
/// they care about.
pub trait EscalatorUpdater {
    /// Row is about to be inserted into the visible tree.
    fn pre_attach(&mut self, _row: &RowInfo, _cells: Cells<'_>) {}

    /// Row was just inserted into the visible tree.
    fn post_attach(&mut self, _row: &RowInfo, _cells: Cells<'_>) {}

    /// Row content must be (re)populated.
    fn update(&mut self, _row: &RowInfo, _cells: Cells<'_>) {}

    /// Row is about to be removed from the visible tree.
    fn pre_detach(&mut self, _row: &RowInfo, _cells: Cells<'_>) {}

    /// Row was just removed from the visible tree.
    fn post_detach(&mut self, _row: &RowInfo, _cells: Cells<'_>) {}
}

/// Updater that does nothing; the default for every section.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUpdater;

impl EscalatorUpdater for NullUpdater {}

impl<U: EscalatorUpdater + ?Sized> EscalatorUpdater for Box<U> {
    fn pre_attach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        (**self).pre_attach(row, cells);
    }

    fn post_attach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        (**self).post_attach(row, cells);
    }

    fn update(&mut self, row: &RowInfo, cells: Cells<'_>) {
        (**self).update(row, cells);
    }

    fn pre_detach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        (**self).pre_detach(row, cells);
    }

    fn post_detach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        (**self).post_detach(row, cells);
    }
}

/// Writes `"{row}:{column}"` into every updated cell. Handy for demos and
/// tests that need content identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateUpdater;

impl EscalatorUpdater for CoordinateUpdater {
    fn update(&mut self, _row: &RowInfo, cells: Cells<'_>) {
        for mut cell in cells {
            let content = format!("{}:{}", cell.row(), cell.column());
            cell.set_content(content);
        }
    }

    fn post_detach(&mut self, _row: &RowInfo, cells: Cells<'_>) {
        for mut cell in cells {
            cell.clear();
        }
    }
}

/// Initializes and tears down spacer content.
pub trait SpacerUpdater {
    /// Spacer was created (or a new updater was installed).
    fn init(&mut self, _spacer: &mut crate::spacer::SpacerElement) {}

    /// Spacer is going away (or the updater is being replaced).
    fn destroy(&mut self, _spacer: &mut crate::spacer::SpacerElement) {}
}

/// Spacer updater that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpacerUpdater;

impl SpacerUpdater for NullSpacerUpdater {}

impl<U: SpacerUpdater + ?Sized> SpacerUpdater for Box<U> {
    fn init(&mut self, spacer: &mut crate::spacer::SpacerElement) {
        (**self).init(spacer);
    }

    fn destroy(&mut self, spacer: &mut crate::spacer::SpacerElement) {
        (**self).destroy(spacer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(columns: &[usize]) -> Vec<CellElement> {
        columns.iter().map(|&c| CellElement::new(c)).collect()
    }

    #[test]
    fn cells_filter_by_column() {
        let mut elements = cells(&[0, 1, 2, 5]);
        let only = [1usize, 5];
        let seen: Vec<usize> = Cells::new(3, &mut elements, Some(&only[..]))
            .map(|cell| cell.column())
            .collect();
        assert_eq!(seen, vec![1, 5]);
    }

    #[test]
    fn columns_peek_without_consuming() {
        let mut elements = cells(&[0, 1, 2, 5]);
        let only = [0usize, 2, 5];
        let mut iter = Cells::new(3, &mut elements, Some(&only[..]));
        assert_eq!(iter.columns(), vec![0, 2, 5]);
        assert_eq!(iter.next().map(|cell| cell.column()), Some(0));
        assert_eq!(iter.columns(), vec![2, 5]);
        assert_eq!(iter.row(), 3);
    }

    #[test]
    fn flyweight_writes_through_and_snapshots() {
        let mut elements = cells(&[0, 1]);
        let mut snapshots = Vec::new();
        for mut cell in Cells::new(7, &mut elements, None) {
            cell.set_content(format!("c{}", cell.column()));
            snapshots.push(cell.snapshot());
        }
        assert_eq!(elements[1].content(), "c1");
        assert_eq!(snapshots[0].row, 7);
        assert_eq!(snapshots[0].content, "c0");
    }

    #[test]
    fn coordinate_updater_labels_cells() {
        let mut elements = cells(&[2]);
        let info = RowInfo {
            section: Section::Body,
            index: 4,
            element: ElementId::new(Section::Body, 0),
            top: 80.0,
            height: 20.0,
            attached: true,
        };
        CoordinateUpdater.update(&info, Cells::new(4, &mut elements, None));
        assert_eq!(elements[0].content(), "4:2");
        CoordinateUpdater.post_detach(&info, Cells::new(4, &mut elements, None));
        assert!(elements[0].content().is_empty());
    }
}
