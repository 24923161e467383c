//! Render-target pool.
//!
//! Row elements are created lazily, the first time a section needs more of
//! them than it has, and are never dropped before the Escalator itself. An
//! unbound element sits on the free list and keeps its cells so the next
//! attach can reuse them.

use std::fmt;

use escalator_core::Section;

use crate::updater::CellElement;

/// Stable identity of a pooled row element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    section: Section,
    serial: u32,
}

impl ElementId {
    #[must_use]
    pub const fn new(section: Section, serial: u32) -> Self {
        Self { section, serial }
    }

    #[must_use]
    pub const fn section(self) -> Section {
        self.section
    }

    #[must_use]
    pub const fn serial(self) -> u32 {
        self.serial
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.section, self.serial)
    }
}

/// A pooled row element with its cells.
#[derive(Debug, Clone)]
pub struct RowElement {
    pub(crate) id: ElementId,
    pub(crate) index: Option<usize>,
    pub(crate) top: f64,
    pub(crate) height: f64,
    pub(crate) attached: bool,
    /// Materialized cells in column order.
    pub(crate) cells: Vec<CellElement>,
    /// Cells recycled from columns that left; reused before allocating.
    pub(crate) spare: Vec<CellElement>,
}

impl RowElement {
    fn new(id: ElementId) -> Self {
        Self {
            id,
            index: None,
            top: 0.0,
            height: 0.0,
            attached: false,
            cells: Vec::new(),
            spare: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Logical row index the element is bound to, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Section-local top edge (spacers included).
    #[must_use]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Materialized cells, ordered by column.
    #[must_use]
    pub fn cells(&self) -> &[CellElement] {
        &self.cells
    }

    /// Cell bound to `column`, if materialized.
    #[must_use]
    pub fn cell(&self, column: usize) -> Option<&CellElement> {
        self.cells
            .binary_search_by_key(&column, |cell| cell.column)
            .ok()
            .map(|at| &self.cells[at])
    }

    #[must_use]
    pub fn spare_cells(&self) -> usize {
        self.spare.len()
    }

    /// Take a recycled cell for `column`, or allocate one.
    pub(crate) fn take_cell(&mut self, column: usize) -> CellElement {
        match self.spare.pop() {
            Some(mut cell) => {
                cell.column = column;
                cell.content.clear();
                cell
            }
            None => CellElement::new(column),
        }
    }
}

/// Arena of row elements for one section.
#[derive(Debug, Clone)]
pub struct RowPool {
    section: Section,
    elements: Vec<RowElement>,
    free: Vec<usize>,
}

impl RowPool {
    #[must_use]
    pub fn new(section: Section) -> Self {
        Self {
            section,
            elements: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of elements ever created.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.elements.len()
    }

    /// Number of unbound elements.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Slot of an unbound element, creating one if the free list is empty.
    pub(crate) fn acquire(&mut self) -> usize {
        if let Some(slot) = self.free.pop() {
            return slot;
        }
        let slot = self.elements.len();
        let serial = u32::try_from(slot).unwrap_or(u32::MAX);
        self.elements
            .push(RowElement::new(ElementId::new(self.section, serial)));
        slot
    }

    /// Return an element to the free list.
    pub(crate) fn release(&mut self, slot: usize) {
        let element = &mut self.elements[slot];
        element.index = None;
        element.attached = false;
        self.free.push(slot);
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> &RowElement {
        &self.elements[slot]
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> &mut RowElement {
        &mut self.elements[slot]
    }

    /// All elements, bound or free.
    pub fn iter(&self) -> impl Iterator<Item = &RowElement> {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_reuses_released_slots() {
        let mut pool = RowPool::new(Section::Body);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.pool_size(), 2);
        pool.release(a);
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.acquire(), a);
        assert_eq!(pool.pool_size(), 2);
        assert_ne!(pool.get(a).id(), pool.get(b).id());
    }

    #[test]
    fn release_unbinds() {
        let mut pool = RowPool::new(Section::Header);
        let slot = pool.acquire();
        pool.get_mut(slot).index = Some(4);
        pool.get_mut(slot).attached = true;
        pool.release(slot);
        assert_eq!(pool.get(slot).index(), None);
        assert!(!pool.get(slot).is_attached());
        assert_eq!(pool.get(slot).id().to_string(), "header#0");
    }

    #[test]
    fn spare_cells_are_recycled() {
        let mut pool = RowPool::new(Section::Body);
        let slot = pool.acquire();
        let row = pool.get_mut(slot);
        let mut cell = row.take_cell(3);
        cell.content.push_str("old");
        row.spare.push(cell);
        let reused = row.take_cell(8);
        assert_eq!(reused.column(), 8);
        assert!(reused.content().is_empty());
        assert_eq!(row.spare_cells(), 0);
    }
}
