//! Row container state and pool convergence.
//!
//! A [`SectionState`] owns one section's row count, row height, element pool
//! and updater, plus the contiguous window of logical rows currently bound to
//! pooled elements. A mutation first [plans](SectionState::plan) the move from
//! the old window to the new one, then runs it in three phases:
//!
//! 1. **detach**: rows that were removed, and leaving rows that cannot be
//!    reused, get `pre_detach` / `post_detach` and go back to the free list.
//! 2. **update**: leaving rows are rebound in place to entering indices, and
//!    kept rows whose logical index shifted, get `update` only.
//! 3. **attach**: entering rows left over take an element from the free list
//!    (or a new one) and get `pre_attach` / `post_attach` / `update`.
//!
//! Column changes go through the same phases at cell granularity. The
//! Escalator runs each phase across every affected section and the cells
//! before starting the next one, so no detach of a mutation follows one of
//! its attaches.

use std::collections::BTreeMap;

use escalator_core::{IndexRange, Section};

use crate::columns::{ColumnSet, Columns};
use crate::pool::{RowElement, RowPool};
use crate::spacer::SpacerIndex;
use crate::updater::{CellElement, Cells, EscalatorUpdater, NullUpdater, RowInfo};

/// Callback counts of one converged mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Convergence {
    /// Rows detached (`pre_detach` + `post_detach`).
    pub detached: usize,
    /// Rows rebound to a new index in place (`update` only).
    pub rebound: usize,
    /// Kept rows whose index shifted (`update` only).
    pub renumbered: usize,
    /// Rows refreshed in place (`update` only).
    pub refreshed: usize,
    /// Rows attached (`pre_attach` + `post_attach` + `update`).
    pub attached: usize,
    /// Cells detached from rows that stay bound.
    pub cells_detached: usize,
    /// Cells attached to rows that were already bound.
    pub cells_attached: usize,
    /// Cells updated after a column change (renumbered or attached).
    pub cells_updated: usize,
}

impl Convergence {
    /// Total number of updater callbacks issued at row level.
    #[must_use]
    pub fn row_callbacks(&self) -> usize {
        self.detached * 2 + self.rebound + self.renumbered + self.refreshed + self.attached * 3
    }

    #[must_use]
    pub fn is_quiet(&self) -> bool {
        *self == Self::default()
    }
}

/// Vertical placement of a section's rows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowLayout<'a> {
    pub(crate) row_height: f64,
    pub(crate) spacers: Option<&'a SpacerIndex>,
}

impl RowLayout<'_> {
    pub(crate) fn top(&self, index: usize) -> f64 {
        let spacers = self.spacers.map_or(0.0, |spacers| spacers.sum_before(index));
        index as f64 * self.row_height + spacers
    }
}

/// Horizontal placement of cells.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellLayout<'a> {
    pub(crate) columns: &'a Columns,
    pub(crate) set: ColumnSet,
    pub(crate) scroll_left: f64,
}

impl CellLayout<'_> {
    fn place(&self, cell: &mut CellElement) {
        let column = cell.column;
        let frozen = self.columns.frozen_count();
        cell.left = self.columns.left(column);
        cell.width = self.columns.actual(column).unwrap_or(0.0);
        cell.frozen = column < frozen;
        cell.last_frozen = column + 1 == frozen;
        cell.translate_x = if cell.frozen { 0.0 } else { -self.scroll_left };
    }
}

/// Columns per pool slot that still owe an `update` after the attach phase.
pub(crate) type PendingCells = BTreeMap<usize, Vec<usize>>;

/// Row-level work of one convergence, computed before any callback runs.
#[derive(Debug)]
pub(crate) struct RowPlan {
    target: IndexRange,
    /// `next[k]` is the slot that will serve row `target.start() + k`.
    next: Vec<Option<usize>>,
    detach: Vec<usize>,
    /// Rows that get `update` only, flagged `true` when rebound.
    updates: Vec<(usize, bool)>,
    attach: Vec<usize>,
}

/// One section's rows, pool and updater.
pub(crate) struct SectionState {
    pub(crate) section: Section,
    pub(crate) row_count: usize,
    pub(crate) row_height: f64,
    pub(crate) pool: RowPool,
    /// Logical rows bound to elements.
    pub(crate) window: IndexRange,
    /// `slots[k]` is the pool slot bound to row `window.start() + k`.
    pub(crate) slots: Vec<usize>,
    pub(crate) updater: Box<dyn EscalatorUpdater>,
}

fn row_info(section: Section, element: &RowElement) -> RowInfo {
    RowInfo {
        section,
        index: element.index.unwrap_or_default(),
        element: element.id,
        top: element.top,
        height: element.height,
        attached: element.attached,
    }
}

impl SectionState {
    pub(crate) fn new(section: Section, row_height: f64) -> Self {
        Self {
            section,
            row_count: 0,
            row_height,
            pool: RowPool::new(section),
            window: IndexRange::EMPTY,
            slots: Vec::new(),
            updater: Box::new(NullUpdater),
        }
    }

    /// Vertical placement of this section's rows; only the body has spacers.
    pub(crate) fn layout<'a>(&self, spacers: &'a SpacerIndex) -> RowLayout<'a> {
        RowLayout {
            row_height: self.row_height,
            spacers: (self.section == Section::Body).then_some(spacers),
        }
    }

    /// Pixel height of all rows (spacers not included).
    pub(crate) fn rows_height(&self) -> f64 {
        self.row_count as f64 * self.row_height
    }

    pub(crate) fn slot_of(&self, index: usize) -> Option<usize> {
        if self.window.contains(index) {
            self.slots.get(index - self.window.start()).copied()
        } else {
            None
        }
    }

    pub(crate) fn element(&self, index: usize) -> Option<&RowElement> {
        self.slot_of(index).map(|slot| self.pool.get(slot))
    }

    /// Bound elements in logical order.
    pub(crate) fn materialized(&self) -> impl Iterator<Item = &RowElement> {
        self.slots.iter().map(|&slot| self.pool.get(slot))
    }

    // ── Row lifecycle ────────────────────────────────────────────────

    fn attach(
        &mut self,
        slot: usize,
        index: usize,
        rows: &RowLayout<'_>,
        cells: &CellLayout<'_>,
        stats: &mut Convergence,
    ) {
        let element = self.pool.get_mut(slot);
        element.index = Some(index);
        element.top = rows.top(index);
        element.height = rows.row_height;
        element.attached = false;
        sync_cells(element, cells);
        self.attach_callbacks(slot);
        stats.attached += 1;
    }

    /// Run the detach phase on `slot` and return it to the free list.
    fn detach(&mut self, slot: usize, stats: &mut Convergence) {
        self.detach_callbacks(slot);
        self.pool.release(slot);
        stats.detached += 1;
    }

    fn detach_callbacks(&mut self, slot: usize) {
        let Self {
            section,
            pool,
            updater,
            ..
        } = self;
        let element = pool.get_mut(slot);
        let index = element.index.unwrap_or_default();
        let info = row_info(*section, element);
        updater.pre_detach(&info, Cells::new(index, &mut element.cells, None));
        element.attached = false;
        let info = row_info(*section, element);
        updater.post_detach(&info, Cells::new(index, &mut element.cells, None));
    }

    fn attach_callbacks(&mut self, slot: usize) {
        let Self {
            section,
            pool,
            updater,
            ..
        } = self;
        let element = pool.get_mut(slot);
        let index = element.index.unwrap_or_default();
        let info = row_info(*section, element);
        updater.pre_attach(&info, Cells::new(index, &mut element.cells, None));
        element.attached = true;
        let info = row_info(*section, element);
        updater.post_attach(&info, Cells::new(index, &mut element.cells, None));
        updater.update(&info, Cells::new(index, &mut element.cells, None));
    }

    /// Bind `slot` to `index` without leaving the screen and refresh it.
    fn rebind(&mut self, slot: usize, index: usize, rows: &RowLayout<'_>) {
        let element = self.pool.get_mut(slot);
        element.index = Some(index);
        element.top = rows.top(index);
        self.update(slot);
    }

    fn update(&mut self, slot: usize) {
        let Self {
            section,
            pool,
            updater,
            ..
        } = self;
        let element = pool.get_mut(slot);
        let index = element.index.unwrap_or_default();
        let info = row_info(*section, element);
        updater.update(&info, Cells::new(index, &mut element.cells, None));
    }

    /// Plan the move from the current window to `target`.
    ///
    /// `remap` maps a pre-mutation index to its post-mutation index (`None`
    /// for removed rows) and must be strictly increasing where defined.
    pub(crate) fn plan<F>(&self, target: IndexRange, remap: F) -> RowPlan
    where
        F: Fn(usize) -> Option<usize>,
    {
        let base = target.start();
        let mut next: Vec<Option<usize>> = vec![None; target.len()];
        let mut updates = Vec::new();
        let mut leaving = Vec::new();
        let mut detach = Vec::new();

        for (k, &slot) in self.slots.iter().enumerate() {
            let old = self.window.start() + k;
            match remap(old) {
                None => detach.push(slot),
                Some(new) if target.contains(new) => {
                    next[new - base] = Some(slot);
                    if new != old {
                        updates.push((new, false));
                    }
                }
                Some(_) => leaving.push(slot),
            }
        }

        let entering: Vec<usize> = target
            .iter()
            .filter(|&index| next[index - base].is_none())
            .collect();
        let reuse = leaving.len().min(entering.len());
        detach.extend(leaving.split_off(reuse));
        for (&index, slot) in entering.iter().zip(leaving) {
            next[index - base] = Some(slot);
            updates.push((index, true));
        }
        updates.sort_unstable_by_key(|&(index, _)| index);

        RowPlan {
            target,
            next,
            detach,
            updates,
            attach: entering[reuse..].to_vec(),
        }
    }

    /// Detach phase of `plan`. Afterwards `slots` lists only the rows that
    /// stay bound, so cell passes skip the detached ones.
    pub(crate) fn detach_rows(&mut self, plan: &RowPlan, stats: &mut Convergence) {
        for &slot in &plan.detach {
            self.detach(slot, stats);
        }
        self.slots = plan.next.iter().flatten().copied().collect();
    }

    /// Update phase of `plan`: rebound and renumbered rows.
    pub(crate) fn update_rows(&mut self, plan: &RowPlan, rows: &RowLayout<'_>, stats: &mut Convergence) {
        let base = plan.target.start();
        for &(index, rebound) in &plan.updates {
            if let Some(slot) = plan.next[index - base] {
                self.rebind(slot, index, rows);
                if rebound {
                    stats.rebound += 1;
                } else {
                    stats.renumbered += 1;
                }
            }
        }
    }

    /// Attach phase of `plan`, then install its window.
    pub(crate) fn attach_rows(
        &mut self,
        plan: RowPlan,
        rows: &RowLayout<'_>,
        cells: &CellLayout<'_>,
        stats: &mut Convergence,
    ) {
        let RowPlan {
            target,
            mut next,
            attach,
            ..
        } = plan;
        let base = target.start();
        for index in attach {
            let slot = self.pool.acquire();
            self.attach(slot, index, rows, cells, stats);
            next[index - base] = Some(slot);
        }
        self.window = target;
        self.slots = next.into_iter().flatten().collect();
        debug_assert_eq!(self.slots.len(), self.window.len());
    }


    /// `update` on the materialized rows inside `range`.
    pub(crate) fn refresh(&mut self, range: IndexRange, stats: &mut Convergence) {
        for index in range.intersection(&self.window) {
            if let Some(slot) = self.slot_of(index) {
                self.update(slot);
                stats.refreshed += 1;
            }
        }
    }

    /// Swap the updater: detach phase on every bound row with the old one,
    /// then attach phase with the new one.
    pub(crate) fn replace_updater(
        &mut self,
        updater: Box<dyn EscalatorUpdater>,
        stats: &mut Convergence,
    ) -> Box<dyn EscalatorUpdater> {
        let slots = self.slots.clone();
        for &slot in &slots {
            self.detach_callbacks(slot);
            stats.detached += 1;
        }
        let old = std::mem::replace(&mut self.updater, updater);
        for &slot in &slots {
            self.attach_callbacks(slot);
            stats.attached += 1;
        }
        old
    }

    /// Recompute row tops and cell positions without callbacks.
    pub(crate) fn relayout(&mut self, rows: &RowLayout<'_>, cells: &CellLayout<'_>) {
        for (k, &slot) in self.slots.iter().enumerate() {
            let element = self.pool.get_mut(slot);
            element.top = rows.top(self.window.start() + k);
            element.height = rows.row_height;
            for cell in &mut element.cells {
                cells.place(cell);
            }
        }
    }

    // ── Cell lifecycle ───────────────────────────────────────────────

    /// Detach phase for cells whose column was removed or left the set.
    /// The cells that stay are renumbered and placed; the renumbered ones
    /// are returned as owing an `update`.
    pub(crate) fn detach_cells<F>(
        &mut self,
        remap: &F,
        cells: &CellLayout<'_>,
        stats: &mut Convergence,
    ) -> PendingCells
    where
        F: Fn(usize) -> Option<usize>,
    {
        let Self {
            section,
            pool,
            updater,
            slots,
            ..
        } = self;
        let mut pending = PendingCells::new();
        for &slot in slots.iter() {
            let element = pool.get_mut(slot);
            let leaving: Vec<usize> = element
                .cells
                .iter()
                .map(|cell| cell.column)
                .filter(|&column| remap(column).is_none_or(|new| !cells.set.contains(new)))
                .collect();
            if !leaving.is_empty() {
                let index = element.index.unwrap_or_default();
                let info = row_info(*section, element);
                updater.pre_detach(&info, Cells::new(index, &mut element.cells, Some(leaving.as_slice())));

                let (mut gone, kept): (Vec<CellElement>, Vec<CellElement>) =
                    std::mem::take(&mut element.cells)
                        .into_iter()
                        .partition(|cell| leaving.binary_search(&cell.column).is_ok());
                element.cells = kept;
                updater.post_detach(&info, Cells::new(index, &mut gone, None));
                stats.cells_detached += gone.len();
                element.spare.append(&mut gone);
            }

            let mut renumbered = Vec::new();
            for cell in &mut element.cells {
                if let Some(new) = remap(cell.column) {
                    if new != cell.column {
                        cell.column = new;
                        renumbered.push(new);
                    }
                }
                cells.place(cell);
            }
            if !renumbered.is_empty() {
                pending.insert(slot, renumbered);
            }
        }
        pending
    }

    /// Attach phase for columns that entered the set. Entering columns are
    /// added to `pending`.
    pub(crate) fn attach_cells(
        &mut self,
        cells: &CellLayout<'_>,
        pending: &mut PendingCells,
        stats: &mut Convergence,
    ) {
        let Self {
            section,
            pool,
            updater,
            slots,
            ..
        } = self;
        for &slot in slots.iter() {
            let element = pool.get_mut(slot);
            let entering: Vec<usize> = cells
                .set
                .iter()
                .filter(|column| {
                    element
                        .cells
                        .binary_search_by_key(column, |cell| cell.column)
                        .is_err()
                })
                .collect();
            if entering.is_empty() {
                continue;
            }
            let mut fresh: Vec<CellElement> = entering
                .iter()
                .map(|&column| {
                    let mut cell = element.take_cell(column);
                    cells.place(&mut cell);
                    cell
                })
                .collect();
            let index = element.index.unwrap_or_default();
            let info = row_info(*section, element);
            updater.pre_attach(&info, Cells::new(index, &mut fresh, None));
            element.cells.append(&mut fresh);
            element.cells.sort_by_key(|cell| cell.column);
            updater.post_attach(&info, Cells::new(index, &mut element.cells, Some(entering.as_slice())));
            stats.cells_attached += entering.len();

            let owed = pending.entry(slot).or_default();
            owed.extend_from_slice(&entering);
            owed.sort_unstable();
        }
    }

    /// Update phase for the cells in `pending`, in row order.
    pub(crate) fn update_cells(&mut self, pending: &PendingCells, stats: &mut Convergence) {
        let Self {
            section,
            pool,
            updater,
            slots,
            ..
        } = self;
        for slot in slots.iter() {
            let Some(columns) = pending.get(slot) else {
                continue;
            };
            let element = pool.get_mut(*slot);
            let index = element.index.unwrap_or_default();
            let info = row_info(*section, element);
            updater.update(&info, Cells::new(index, &mut element.cells, Some(columns.as_slice())));
            stats.cells_updated += columns.len();
        }
    }


    /// `update` restricted to the materialized cells of `columns`.
    pub(crate) fn refresh_cells(&mut self, columns: IndexRange, stats: &mut Convergence) {
        let Self {
            section,
            pool,
            updater,
            slots,
            ..
        } = self;
        for &slot in slots.iter() {
            let element = pool.get_mut(slot);
            let only: Vec<usize> = element
                .cells
                .iter()
                .map(|cell| cell.column)
                .filter(|&column| columns.contains(column))
                .collect();
            if only.is_empty() {
                continue;
            }
            let index = element.index.unwrap_or_default();
            let info = row_info(*section, element);
            updater.update(&info, Cells::new(index, &mut element.cells, Some(only.as_slice())));
            stats.cells_updated += only.len();
        }
    }
}

/// Bring an off-screen element's cells in line with the column set.
fn sync_cells(element: &mut RowElement, layout: &CellLayout<'_>) {
    let mut old = std::mem::take(&mut element.cells).into_iter().peekable();
    let mut next = Vec::with_capacity(layout.set.len());
    for column in layout.set.iter() {
        while let Some(cell) = old.next_if(|cell| cell.column < column) {
            element.spare.push(cell);
        }
        let mut cell = match old.next_if(|cell| cell.column == column) {
            Some(cell) => cell,
            None => element.take_cell(column),
        };
        layout.place(&mut cell);
        next.push(cell);
    }
    element.spare.extend(old);
    element.cells = next;
}
