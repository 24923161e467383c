//! The Escalator: three row containers, shared column configuration, body
//! spacers and the scroll coordinator behind one owned value.
//!
//! Every public mutation validates its arguments first (an `Err` leaves the
//! table untouched), applies the bookkeeping change, and then converges the
//! render-target pools before returning. The result of the last convergence
//! is available from [`Escalator::last_convergence`].

use std::collections::BTreeMap;
use std::fmt;

use escalator_core::config::{DEFAULT_COLUMN_WIDTH, check_non_negative, check_positive};
use escalator_core::{EscalatorConfig, EscalatorError, HeightMode, IndexRange, Result, Section};
use unicode_width::UnicodeWidthStr;

use crate::columns::{ColumnSet, ColumnWidth, Columns};
use crate::pool::RowElement;
use crate::row_container::{CellLayout, Convergence, PendingCells, RowPlan, SectionState};
use crate::spacer::{SpacerElement, SpacerIndex};
use crate::updater::{EscalatorUpdater, NullSpacerUpdater, SpacerUpdater};
use crate::viewport::{BodyMetrics, ScrollAxis, ScrollDestination, scroll_pos};

/// Handle returned when a listener is added to an [`Escalator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type VisibilityListener = Box<dyn FnMut(IndexRange)>;
type ScrollListener = Box<dyn FnMut(f64, f64)>;

type Remap<'a> = &'a dyn Fn(usize) -> Option<usize>;

/// Row sections and columns touched by one mutation, with their index
/// remaps.
#[derive(Default)]
struct Change<'a> {
    rows: [Option<Remap<'a>>; 3],
    columns: Option<Remap<'a>>,
}

impl<'a> Change<'a> {
    fn rows(mut self, section: Section, remap: Remap<'a>) -> Self {
        self.rows[section_slot(section)] = Some(remap);
        self
    }

    fn columns(mut self, remap: Remap<'a>) -> Self {
        self.columns = Some(remap);
        self
    }

    /// Every section and the columns, no index shifts.
    fn everything() -> Self {
        let keep: Remap<'static> = &keep_index;
        Self {
            rows: [Some(keep); 3],
            columns: Some(keep),
        }
    }
}

/// Position of `section` in [`Section::ALL`].
fn section_slot(section: Section) -> usize {
    match section {
        Section::Header => 0,
        Section::Body => 1,
        Section::Footer => 2,
    }
}

/// Virtualized table core.
pub struct Escalator {
    config: EscalatorConfig,
    columns: Columns,
    header: SectionState,
    body: SectionState,
    footer: SectionState,
    spacers: SpacerIndex,
    spacer_updater: Box<dyn SpacerUpdater>,
    width: f64,
    height: f64,
    height_mode: HeightMode,
    scroll_top: f64,
    scroll_left: f64,
    column_set: ColumnSet,
    visible_rows: IndexRange,
    listeners: Vec<(ListenerId, VisibilityListener)>,
    scroll_listeners: Vec<(ListenerId, ScrollListener)>,
    /// `(scroll_left, scroll_top)` last reported to scroll listeners.
    notified_scroll: (f64, f64),
    vertical_locked: bool,
    horizontal_locked: bool,
    next_listener: u64,
    last: Convergence,
}

impl fmt::Debug for Escalator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escalator")
            .field("columns", &self.columns.count())
            .field("frozen", &self.columns.frozen_count())
            .field("header_rows", &self.header.row_count)
            .field("body_rows", &self.body.row_count)
            .field("footer_rows", &self.footer.row_count)
            .field("spacers", &self.spacers.len())
            .field("size", &(self.width, self.height()))
            .field("scroll", &(self.scroll_left, self.scroll_top))
            .field("body_window", &self.body.window)
            .field("column_set", &self.column_set)
            .finish()
    }
}

impl Default for Escalator {
    fn default() -> Self {
        Self::build(EscalatorConfig::default())
    }
}

impl Escalator {
    /// Create an empty table (no rows, no columns).
    pub fn new(config: EscalatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EscalatorConfig) -> Self {
        Self {
            columns: Columns::new(),
            header: SectionState::new(Section::Header, config.header_row_height),
            body: SectionState::new(Section::Body, config.body_row_height),
            footer: SectionState::new(Section::Footer, config.footer_row_height),
            spacers: SpacerIndex::new(),
            spacer_updater: Box::new(NullSpacerUpdater),
            width: config.width,
            height: config.height,
            height_mode: config.height_mode,
            scroll_top: 0.0,
            scroll_left: 0.0,
            column_set: ColumnSet::default(),
            visible_rows: IndexRange::EMPTY,
            listeners: Vec::new(),
            scroll_listeners: Vec::new(),
            notified_scroll: (0.0, 0.0),
            vertical_locked: false,
            horizontal_locked: false,
            next_listener: 0,
            last: Convergence::default(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EscalatorConfig {
        &self.config
    }

    /// Callback counts of the most recent mutation.
    #[must_use]
    pub fn last_convergence(&self) -> Convergence {
        self.last
    }

    fn state(&self, section: Section) -> &SectionState {
        match section {
            Section::Header => &self.header,
            Section::Body => &self.body,
            Section::Footer => &self.footer,
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Geometry
    // ════════════════════════════════════════════════════════════════

    fn body_metrics(&self) -> BodyMetrics<'_> {
        BodyMetrics {
            row_count: self.body.row_count,
            row_height: self.body.row_height,
            spacers: &self.spacers,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Widget height: the set height, or header + rows + footer when sized
    /// by rows.
    #[must_use]
    pub fn height(&self) -> f64 {
        match self.height_mode {
            HeightMode::Fixed => self.height,
            HeightMode::Rows(rows) => {
                self.header.rows_height() + rows * self.body.row_height + self.footer.rows_height()
            }
        }
    }

    #[must_use]
    pub fn height_mode(&self) -> HeightMode {
        self.height_mode
    }

    /// Height available to body rows.
    #[must_use]
    pub fn body_viewport_height(&self) -> f64 {
        match self.height_mode {
            HeightMode::Fixed => {
                (self.height - self.header.rows_height() - self.footer.rows_height()).max(0.0)
            }
            HeightMode::Rows(rows) => rows * self.body.row_height,
        }
    }

    /// Height of a section's content (spacers included for the body).
    #[must_use]
    pub fn section_height(&self, section: Section) -> f64 {
        match section {
            Section::Body => self.body_metrics().content_height(),
            other => self.state(other).rows_height(),
        }
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    #[must_use]
    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Scrollable body content height.
    #[must_use]
    pub fn scroll_height(&self) -> f64 {
        self.body_metrics().content_height()
    }

    /// Scrollable content width (all columns).
    #[must_use]
    pub fn scroll_width(&self) -> f64 {
        self.columns.total_width()
    }

    fn max_scroll_top(&self) -> f64 {
        (self.scroll_height() - self.body_viewport_height()).max(0.0)
    }

    fn max_scroll_left(&self) -> f64 {
        (self.scroll_width() - self.width).max(0.0)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll_top());
        self.scroll_left = self.scroll_left.clamp(0.0, self.max_scroll_left());
    }

    /// Body rows intersecting the viewport (no overscan).
    #[must_use]
    pub fn visible_row_range(&self) -> IndexRange {
        let viewport = self.body_viewport_height();
        self.body_metrics()
            .visible_rows(self.scroll_top, self.scroll_top + viewport)
    }

    /// Upper bound on body rows that can be visible at once.
    #[must_use]
    pub fn max_visible_row_count(&self) -> usize {
        let rows = (self.body_viewport_height() / self.body.row_height).ceil();
        rows as usize + 1
    }

    /// Body rows that should be materialized: visible rows plus overscan.
    fn target_body_window(&self) -> IndexRange {
        if self.body_viewport_height() <= 0.0 {
            return IndexRange::EMPTY;
        }
        let overscan = self.config.row_overscan;
        self.visible_row_range()
            .expand(overscan, overscan, self.body.row_count)
    }

    fn target_column_set(&self) -> ColumnSet {
        let frozen = self.columns.frozen_count();
        let x0 = self.columns.frozen_width() + self.scroll_left;
        let x1 = self.width + self.scroll_left;
        let visible = self.columns.unfrozen_intersecting(x0, x1);
        let window = if visible.is_empty() {
            visible
        } else {
            let overscan = self.config.column_overscan;
            let grown = visible.expand(overscan, overscan, self.columns.count());
            IndexRange::new(grown.start().max(frozen), grown.end())
        };
        ColumnSet { frozen, window }
    }

    /// Materialized columns.
    #[must_use]
    pub fn materialized_columns(&self) -> ColumnSet {
        self.column_set
    }

    // ════════════════════════════════════════════════════════════════
    // Convergence plumbing
    // ════════════════════════════════════════════════════════════════

    fn target_window(&self, section: Section) -> IndexRange {
        match section {
            Section::Body => self.target_body_window(),
            other => IndexRange::new(0, self.state(other).row_count),
        }
    }

    /// Converge the pools after the bookkeeping of a mutation.
    ///
    /// Each phase runs across every touched section before the next one
    /// starts: row detaches, cell detaches, row updates, cell attaches, row
    /// attaches, cell updates.
    fn converge(&mut self, change: Change<'_>, stats: &mut Convergence) {
        let plans: [Option<RowPlan>; 3] = Section::ALL.map(|section| {
            change.rows[section_slot(section)]
                .map(|remap| self.state(section).plan(self.target_window(section), remap))
        });
        if change.columns.is_some() {
            self.column_set = self.target_column_set();
        }

        let Self {
            header,
            body,
            footer,
            columns,
            spacers,
            column_set,
            scroll_left,
            ..
        } = self;
        let spacers = &*spacers;
        let cells = CellLayout {
            columns,
            set: *column_set,
            scroll_left: *scroll_left,
        };
        let mut sections = [header, body, footer];
        let mut pending: [PendingCells; 3] = Default::default();

        // 1. detach
        for (state, plan) in sections.iter_mut().zip(&plans) {
            if let Some(plan) = plan {
                state.detach_rows(plan, stats);
            }
        }
        if let Some(remap) = change.columns {
            for (state, pending) in sections.iter_mut().zip(&mut pending) {
                *pending = state.detach_cells(&remap, &cells, stats);
            }
        }

        // 2. update
        for (state, plan) in sections.iter_mut().zip(&plans) {
            if let Some(plan) = plan {
                let rows = state.layout(spacers);
                state.update_rows(plan, &rows, stats);
            }
        }

        // 3. attach
        if change.columns.is_some() {
            for (state, pending) in sections.iter_mut().zip(&mut pending) {
                state.attach_cells(&cells, pending, stats);
            }
        }
        for (state, plan) in sections.iter_mut().zip(plans) {
            if let Some(plan) = plan {
                let rows = state.layout(spacers);
                state.attach_rows(plan, &rows, &cells, stats);
            }
        }
        for (state, pending) in sections.iter_mut().zip(&pending) {
            state.update_cells(pending, stats);
        }
    }

    /// Recompute positions, notify listeners and publish the stats.
    fn finish(&mut self, stats: Convergence) {
        let Self {
            header,
            body,
            footer,
            columns,
            spacers,
            column_set,
            scroll_left,
            ..
        } = self;
        let cells = CellLayout {
            columns,
            set: *column_set,
            scroll_left: *scroll_left,
        };
        for state in [header, body, footer] {
            let rows = state.layout(spacers);
            state.relayout(&rows, &cells);
        }

        let visible = self.visible_row_range();
        if visible != self.visible_rows {
            self.visible_rows = visible;
            for (_, listener) in &mut self.listeners {
                listener(visible);
            }
        }

        let scroll = (self.scroll_left, self.scroll_top);
        if scroll != self.notified_scroll {
            self.notified_scroll = scroll;
            escalator_core::debug!(left = scroll.0, top = scroll.1, "scrolled");
            for (_, listener) in &mut self.scroll_listeners {
                listener(scroll.0, scroll.1);
            }
        }

        escalator_core::trace!(
            detached = stats.detached,
            rebound = stats.rebound,
            renumbered = stats.renumbered,
            attached = stats.attached,
            cells_detached = stats.cells_detached,
            cells_attached = stats.cells_attached,
            "converged"
        );
        self.last = stats;
    }

    // ════════════════════════════════════════════════════════════════
    // Row containers
    // ════════════════════════════════════════════════════════════════

    #[must_use]
    pub fn row_count(&self, section: Section) -> usize {
        self.state(section).row_count
    }

    fn check_row_range(&self, section: Section, offset: usize, count: usize) -> Result<()> {
        if count < 1 {
            return Err(EscalatorError::ZeroCount { what: "rows" });
        }
        let row_count = self.row_count(section);
        match offset.checked_add(count) {
            Some(end) if end <= row_count => Ok(()),
            _ => Err(EscalatorError::RowRangeOutOfBounds {
                section,
                offset,
                count,
                row_count,
            }),
        }
    }

    /// Insert `count` rows before `offset`.
    pub fn insert_rows(&mut self, section: Section, offset: usize, count: usize) -> Result<()> {
        let _span = escalator_core::debug_span!(
            "escalator.insert_rows",
            section = section.as_str(),
            offset,
            count
        )
        .entered();

        let row_count = self.row_count(section);
        if offset > row_count {
            return Err(EscalatorError::RowOffsetOutOfBounds {
                section,
                offset,
                row_count,
            });
        }
        if count < 1 {
            return Err(EscalatorError::ZeroCount { what: "rows" });
        }

        let remap = shift_up_from(offset, count);
        let mut change = Change::default().rows(section, &remap);
        if section == Section::Body {
            let inserted_at = self.body_metrics().top(offset);
            self.spacers.shift_for_insert(offset, count);
            self.body.row_count += count;
            if inserted_at < self.scroll_top && !self.vertical_locked {
                self.scroll_top += count as f64 * self.body.row_height;
            }
        } else {
            self.state_mut(section).row_count += count;
            change = change.rows(Section::Body, &keep_index);
        }
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(change, &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Remove rows `offset..offset + count`.
    pub fn remove_rows(&mut self, section: Section, offset: usize, count: usize) -> Result<()> {
        let _span = escalator_core::debug_span!(
            "escalator.remove_rows",
            section = section.as_str(),
            offset,
            count
        )
        .entered();

        self.check_row_range(section, offset, count)?;

        let remap = remove_range(offset, count);
        let mut change = Change::default().rows(section, &remap);
        if section == Section::Body {
            let metrics = self.body_metrics();
            let removed_top = metrics.top(offset);
            let removed_height = metrics.top(offset + count) - removed_top;
            if removed_top < self.scroll_top && !self.vertical_locked {
                self.scroll_top -= removed_height.min(self.scroll_top - removed_top);
            }
            for mut spacer in self.spacers.remove_rows(offset, count) {
                self.spacer_updater.destroy(&mut spacer);
            }
            self.body.row_count -= count;
        } else {
            self.state_mut(section).row_count -= count;
            change = change.rows(Section::Body, &keep_index);
        }
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(change, &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Re-run `update` on the materialized rows among `offset..offset +
    /// count`. Rows outside the window are populated when they attach.
    pub fn refresh_rows(&mut self, section: Section, offset: usize, count: usize) -> Result<()> {
        let _span = escalator_core::debug_span!(
            "escalator.refresh_rows",
            section = section.as_str(),
            offset,
            count
        )
        .entered();

        self.check_row_range(section, offset, count)?;
        let mut stats = Convergence::default();
        self.state_mut(section)
            .refresh(IndexRange::with_len(offset, count), &mut stats);
        self.finish(stats);
        Ok(())
    }

    fn state_mut(&mut self, section: Section) -> &mut SectionState {
        match section {
            Section::Header => &mut self.header,
            Section::Body => &mut self.body,
            Section::Footer => &mut self.footer,
        }
    }

    /// Install a new updater for `section` and return the previous one.
    ///
    /// Materialized rows go through the detach phase with the old updater,
    /// then through the attach phase (and `update`) with the new one.
    pub fn set_escalator_updater(
        &mut self,
        section: Section,
        updater: Box<dyn EscalatorUpdater>,
    ) -> Box<dyn EscalatorUpdater> {
        let mut stats = Convergence::default();
        let old = self.state_mut(section).replace_updater(updater, &mut stats);
        self.finish(stats);
        old
    }

    #[must_use]
    pub fn escalator_updater(&self, section: Section) -> &dyn EscalatorUpdater {
        self.state(section).updater.as_ref()
    }

    pub fn escalator_updater_mut(&mut self, section: Section) -> &mut dyn EscalatorUpdater {
        self.state_mut(section).updater.as_mut()
    }

    /// Change the height of every row in `section`.
    pub fn set_default_row_height(&mut self, section: Section, px: f64) -> Result<()> {
        check_positive("row height", px)?;
        self.state_mut(section).row_height = px;
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(Change::default().rows(Section::Body, &keep_index), &mut stats);
        self.finish(stats);
        Ok(())
    }

    #[must_use]
    pub fn default_row_height(&self, section: Section) -> f64 {
        self.state(section).row_height
    }

    /// Element bound to row `index`.
    ///
    /// `OutOfBounds` if the row does not exist, `IllegalState` if it exists
    /// but is not materialized.
    pub fn row_element(&self, section: Section, index: usize) -> Result<&RowElement> {
        let state = self.state(section);
        if index >= state.row_count {
            return Err(EscalatorError::RowIndexOutOfBounds {
                section,
                index,
                row_count: state.row_count,
            });
        }
        state
            .element(index)
            .ok_or(EscalatorError::RowNotMaterialized { section, index })
    }

    /// Materialized rows in logical order.
    pub fn materialized_rows(&self, section: Section) -> impl Iterator<Item = &RowElement> {
        self.state(section).materialized()
    }

    /// Logical rows currently bound to elements.
    #[must_use]
    pub fn materialized_row_range(&self, section: Section) -> IndexRange {
        self.state(section).window
    }

    /// Row elements ever created for `section`.
    #[must_use]
    pub fn pool_size(&self, section: Section) -> usize {
        self.state(section).pool.pool_size()
    }

    /// Row elements of `section` currently unbound.
    #[must_use]
    pub fn free_count(&self, section: Section) -> usize {
        self.state(section).pool.free_count()
    }

    // ════════════════════════════════════════════════════════════════
    // Column configuration
    // ════════════════════════════════════════════════════════════════

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.count()
    }

    #[must_use]
    pub fn frozen_column_count(&self) -> usize {
        self.columns.frozen_count()
    }

    fn check_column_range(&self, offset: usize, count: usize) -> Result<()> {
        if count < 1 {
            return Err(EscalatorError::ZeroCount { what: "columns" });
        }
        let column_count = self.columns.count();
        match offset.checked_add(count) {
            Some(end) if end <= column_count => Ok(()),
            _ => Err(EscalatorError::ColumnRangeOutOfBounds {
                offset,
                count,
                column_count,
            }),
        }
    }

    /// Insert `count` columns (100 px each) before `offset`.
    pub fn insert_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        let _span = escalator_core::debug_span!("escalator.insert_columns", offset, count).entered();

        let column_count = self.columns.count();
        if offset > column_count {
            return Err(EscalatorError::ColumnOffsetOutOfBounds {
                offset,
                column_count,
            });
        }
        if count < 1 {
            return Err(EscalatorError::ZeroCount { what: "columns" });
        }

        let frozen_before = self.columns.frozen_count();
        let edge = self.columns.left(offset) - self.columns.frozen_width();
        self.columns.insert(offset, count);
        if offset >= frozen_before && self.scroll_left > edge && !self.horizontal_locked {
            self.scroll_left += count as f64 * DEFAULT_COLUMN_WIDTH;
        }
        self.clamp_scroll();

        let remap = shift_up_from(offset, count);
        let mut stats = Convergence::default();
        self.converge(Change::default().columns(&remap), &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Remove columns `offset..offset + count`.
    pub fn remove_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        let _span = escalator_core::debug_span!("escalator.remove_columns", offset, count).entered();

        self.check_column_range(offset, count)?;

        let frozen_before = self.columns.frozen_count();
        let edge = self.columns.left(offset) - self.columns.frozen_width();
        let removed_width = self.columns.left(offset + count) - self.columns.left(offset);
        self.columns.remove(offset, count);
        if offset >= frozen_before && self.scroll_left > edge && !self.horizontal_locked {
            self.scroll_left = edge.max(self.scroll_left - removed_width);
        }
        self.clamp_scroll();

        let remap = remove_range(offset, count);
        let mut stats = Convergence::default();
        self.converge(Change::default().columns(&remap), &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Re-run `update` on the materialized cells of columns `offset..offset
    /// + count` in every section.
    pub fn refresh_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        self.check_column_range(offset, count)?;
        let mut stats = Convergence::default();
        let range = IndexRange::with_len(offset, count);
        for section in Section::ALL {
            self.state_mut(section).refresh_cells(range, &mut stats);
        }
        self.finish(stats);
        Ok(())
    }

    /// Pin the first `count` columns. Does not touch the vertical scroll.
    pub fn set_frozen_column_count(&mut self, count: usize) -> Result<()> {
        let _span =
            escalator_core::debug_span!("escalator.set_frozen_column_count", count).entered();

        let column_count = self.columns.count();
        if count > column_count {
            return Err(EscalatorError::FrozenCountTooLarge {
                count,
                column_count,
            });
        }
        self.columns.set_frozen(count);
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(Change::default().columns(&keep_index), &mut stats);
        self.finish(stats);
        Ok(())
    }

    fn check_width(&self, column: usize, width: ColumnWidth) -> Result<()> {
        let column_count = self.columns.count();
        if column >= column_count {
            return Err(EscalatorError::ColumnNotFound {
                index: column,
                column_count,
            });
        }
        match width {
            ColumnWidth::Fixed(px) if !(px.is_finite() && px >= 0.0) => {
                Err(EscalatorError::InvalidWidth { index: column, width: px })
            }
            _ => Ok(()),
        }
    }

    /// Set one column's width. Fractional pixels are rounded down.
    pub fn set_column_width(&mut self, column: usize, width: ColumnWidth) -> Result<()> {
        let mut widths = BTreeMap::new();
        widths.insert(column, width);
        self.set_column_widths(&widths)
    }

    /// Set several widths at once; all entries are validated before any is
    /// applied.
    pub fn set_column_widths(&mut self, widths: &BTreeMap<usize, ColumnWidth>) -> Result<()> {
        let _span =
            escalator_core::debug_span!("escalator.set_column_widths", columns = widths.len())
                .entered();

        for (&column, &width) in widths {
            self.check_width(column, width)?;
        }
        for (&column, &width) in widths {
            let width = match width {
                ColumnWidth::Fixed(px) => ColumnWidth::px(px),
                ColumnWidth::Auto => ColumnWidth::Auto,
            };
            self.columns.set_defined(column, width);
            let actual = match width {
                ColumnWidth::Fixed(px) => px,
                ColumnWidth::Auto => self.measure_column(column),
            };
            self.columns.set_actual(column, actual);
        }
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(Change::default().columns(&keep_index), &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Defined width of `column`.
    #[must_use]
    pub fn column_width(&self, column: usize) -> Option<ColumnWidth> {
        self.columns.width(column)
    }

    /// Resolved pixel width of `column`.
    #[must_use]
    pub fn column_width_actual(&self, column: usize) -> Option<f64> {
        self.columns.actual(column)
    }

    /// Left edge of `column` in table coordinates.
    #[must_use]
    pub fn column_left(&self, column: usize) -> Option<f64> {
        (column < self.columns.count()).then(|| self.columns.left(column))
    }

    /// Re-measure every `Auto` column from current cell content.
    pub fn recalculate_auto_widths(&mut self) {
        let mut changed = false;
        for column in self.columns.auto_columns() {
            let px = self.measure_column(column);
            changed |= self.columns.set_actual(column, px);
        }
        let mut stats = Convergence::default();
        if changed {
            self.clamp_scroll();
            self.converge(Change::default().columns(&keep_index), &mut stats);
        }
        self.finish(stats);
    }

    /// Widest materialized cell of `column` across all sections.
    fn measure_column(&self, column: usize) -> f64 {
        let widest = Section::ALL
            .into_iter()
            .flat_map(|section| self.state(section).materialized())
            .filter_map(|row| row.cell(column))
            .map(|cell| cell.content().width())
            .max();
        match widest {
            Some(chars) => (chars as f64 * self.config.char_width + self.config.cell_padding).floor(),
            None => DEFAULT_COLUMN_WIDTH,
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Spacers
    // ════════════════════════════════════════════════════════════════

    /// Open, resize or (with a negative height) close the spacer below body
    /// row `row`.
    ///
    /// A spacer starting above the viewport moves the scroll position by its
    /// height change so the rows on screen stay put; a shrinking spacer never
    /// pulls the viewport above its own top edge.
    pub fn set_spacer(&mut self, row: usize, height: f64) -> Result<()> {
        let _span = escalator_core::debug_span!("escalator.set_spacer", row, height).entered();

        let row_count = self.body.row_count;
        if row >= row_count {
            return Err(EscalatorError::InvalidSpacerRow { row, row_count });
        }
        if height.is_nan() || height.is_infinite() {
            return Err(EscalatorError::InvalidDimension {
                what: "spacer height",
                value: height,
            });
        }

        let old_height = self.spacers.height_at(row);
        let spacer_top = self.body_metrics().spacer_top(row);

        if height < 0.0 {
            match self.spacers.remove(row) {
                Some(mut spacer) => self.spacer_updater.destroy(&mut spacer),
                None => return Ok(()),
            }
        } else if !self.spacers.set_height(row, height) {
            self.spacers.insert(SpacerElement::new(row, height));
            if let Some(spacer) = self.spacers.get_mut(row) {
                self.spacer_updater.init(spacer);
            }
        }

        if spacer_top < self.scroll_top && !self.vertical_locked {
            let diff = self.spacers.height_at(row) - old_height;
            self.scroll_top = (self.scroll_top + diff).max(spacer_top);
        }
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(Change::default().rows(Section::Body, &keep_index), &mut stats);
        self.finish(stats);
        Ok(())
    }

    #[must_use]
    pub fn spacer(&self, row: usize) -> Option<&SpacerElement> {
        self.spacers.get(row)
    }

    /// Spacers in row order.
    pub fn spacers(&self) -> impl Iterator<Item = &SpacerElement> {
        self.spacers.iter()
    }

    #[must_use]
    pub fn spacer_heights_sum(&self) -> f64 {
        self.spacers.total()
    }

    /// Body-local top edge of the spacer below `row`.
    #[must_use]
    pub fn spacer_top(&self, row: usize) -> Option<f64> {
        self.spacers
            .get(row)
            .map(|_| self.body_metrics().spacer_top(row))
    }

    /// Body-local top edge of `row`, whether or not it is materialized.
    #[must_use]
    pub fn row_top(&self, section: Section, row: usize) -> f64 {
        match section {
            Section::Body => self.body_metrics().top(row),
            other => row as f64 * self.state(other).row_height,
        }
    }

    /// Install a new spacer updater and return the previous one. Existing
    /// spacers are destroyed with the old updater and initialized with the
    /// new one.
    pub fn set_spacer_updater(&mut self, updater: Box<dyn SpacerUpdater>) -> Box<dyn SpacerUpdater> {
        for spacer in self.spacers.iter_mut() {
            self.spacer_updater.destroy(spacer);
        }
        let old = std::mem::replace(&mut self.spacer_updater, updater);
        for spacer in self.spacers.iter_mut() {
            self.spacer_updater.init(spacer);
        }
        old
    }

    #[must_use]
    pub fn spacer_updater(&self) -> &dyn SpacerUpdater {
        self.spacer_updater.as_ref()
    }

    // ════════════════════════════════════════════════════════════════
    // Viewport
    // ════════════════════════════════════════════════════════════════

    /// Resize the widget. Switches the height mode back to fixed.
    pub fn set_size(&mut self, width: f64, height: f64) -> Result<()> {
        let _span = escalator_core::debug_span!("escalator.set_size", width, height).entered();

        check_non_negative("width", width)?;
        check_non_negative("height", height)?;
        self.width = width;
        self.height = height;
        self.height_mode = HeightMode::Fixed;
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(Change::everything(), &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Size the body to show `rows` rows.
    pub fn set_height_by_rows(&mut self, rows: f64) -> Result<()> {
        check_positive("height by rows", rows)?;
        self.height_mode = HeightMode::Rows(rows);
        self.clamp_scroll();
        let mut stats = Convergence::default();
        self.converge(Change::default().rows(Section::Body, &keep_index), &mut stats);
        self.finish(stats);
        Ok(())
    }

    /// Scroll the body vertically (clamped to the scrollable range). No-op
    /// while the vertical axis is locked.
    pub fn set_scroll_top(&mut self, y: f64) {
        let _span = escalator_core::debug_span!("escalator.set_scroll_top", y).entered();

        if self.vertical_locked {
            return;
        }
        let y = if y.is_nan() { 0.0 } else { y };
        self.scroll_top = y.clamp(0.0, self.max_scroll_top());
        let mut stats = Convergence::default();
        self.converge(Change::default().rows(Section::Body, &keep_index), &mut stats);
        self.finish(stats);
    }

    /// Scroll the unfrozen columns horizontally (clamped). No-op while the
    /// horizontal axis is locked.
    pub fn set_scroll_left(&mut self, x: f64) {
        let _span = escalator_core::debug_span!("escalator.set_scroll_left", x).entered();

        if self.horizontal_locked {
            return;
        }
        let x = if x.is_nan() { 0.0 } else { x };
        self.scroll_left = x.clamp(0.0, self.max_scroll_left());
        let mut stats = Convergence::default();
        self.converge(Change::default().columns(&keep_index), &mut stats);
        self.finish(stats);
    }

    fn scroll_body_to(
        &mut self,
        start: f64,
        end: f64,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        let pos = scroll_pos(
            destination,
            start,
            end,
            self.scroll_top,
            self.body_viewport_height(),
            padding,
        )?;
        self.set_scroll_top(pos);
        Ok(())
    }

    fn check_body_row(&self, row: usize) -> Result<()> {
        let row_count = self.body.row_count;
        if row >= row_count {
            return Err(EscalatorError::RowIndexOutOfBounds {
                section: Section::Body,
                index: row,
                row_count,
            });
        }
        Ok(())
    }

    /// Scroll so body row `row` is at `destination`.
    pub fn scroll_to_row(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        self.check_body_row(row)?;
        let top = self.body_metrics().top(row);
        self.scroll_body_to(top, top + self.body.row_height, destination, padding)
    }

    /// Scroll so the spacer below `row` is at `destination`.
    pub fn scroll_to_spacer(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        self.check_body_row(row)?;
        let height = self
            .spacers
            .get(row)
            .map(SpacerElement::height)
            .ok_or(EscalatorError::NoSpacer { row })?;
        let top = self.body_metrics().spacer_top(row);
        self.scroll_body_to(top, top + height, destination, padding)
    }

    /// Scroll so `row` together with its spacer (if any) is at
    /// `destination`.
    pub fn scroll_to_row_and_spacer(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        self.check_body_row(row)?;
        let top = self.body_metrics().top(row);
        let end = top + self.body.row_height + self.spacers.height_at(row);
        self.scroll_body_to(top, end, destination, padding)
    }

    /// Scroll so unfrozen `column` is at `destination` within the scrolling
    /// region.
    pub fn scroll_to_column(
        &mut self,
        column: usize,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        let column_count = self.columns.count();
        if column >= column_count {
            return Err(EscalatorError::ColumnIndexOutOfBounds {
                index: column,
                column_count,
            });
        }
        let frozen_count = self.columns.frozen_count();
        if column < frozen_count {
            return Err(EscalatorError::FrozenColumnTarget {
                index: column,
                frozen_count,
            });
        }
        let frozen_width = self.columns.frozen_width();
        let start = self.columns.left(column) - frozen_width;
        let end = start + self.columns.actual(column).unwrap_or(0.0);
        let viewport = (self.width - frozen_width).max(0.0);
        let pos = scroll_pos(destination, start, end, self.scroll_left, viewport, padding)?;
        self.set_scroll_left(pos);
        Ok(())
    }

    /// Lock or unlock scrolling along `axis`.
    ///
    /// A locked axis ignores `set_scroll_*` and `scroll_to_*` (which still
    /// validate their arguments) and skips the scroll moves that keep content
    /// in place across inserts, removals and spacer changes. Positions are
    /// still clamped when the content shrinks.
    pub fn set_scroll_locked(&mut self, axis: ScrollAxis, locked: bool) {
        escalator_core::debug!(axis = axis.as_str(), locked, "scroll lock");
        match axis {
            ScrollAxis::Vertical => self.vertical_locked = locked,
            ScrollAxis::Horizontal => self.horizontal_locked = locked,
        }
    }

    #[must_use]
    pub fn is_scroll_locked(&self, axis: ScrollAxis) -> bool {
        match axis {
            ScrollAxis::Vertical => self.vertical_locked,
            ScrollAxis::Horizontal => self.horizontal_locked,
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Listeners
    // ════════════════════════════════════════════════════════════════

    fn next_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// Call `listener` with the new visible body range whenever it changes.
    pub fn add_row_visibility_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(IndexRange) + 'static,
    {
        let id = self.next_listener_id();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn remove_row_visibility_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Call `listener` with `(scroll_left, scroll_top)` after every mutation
    /// that moved either of them, including clamping and the moves that
    /// keep content in place.
    pub fn add_scroll_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(f64, f64) + 'static,
    {
        let id = self.next_listener_id();
        self.scroll_listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn remove_scroll_listener(&mut self, id: ListenerId) -> bool {
        let before = self.scroll_listeners.len();
        self.scroll_listeners.retain(|(listener, _)| *listener != id);
        self.scroll_listeners.len() != before
    }
}

fn keep_index(index: usize) -> Option<usize> {
    Some(index)
}

/// Index remap for `count` items inserted at `offset`.
fn shift_up_from(offset: usize, count: usize) -> impl Fn(usize) -> Option<usize> {
    move |index| Some(if index < offset { index } else { index + count })
}

/// Index remap for items `offset..offset + count` removed.
fn remove_range(offset: usize, count: usize) -> impl Fn(usize) -> Option<usize> {
    move |index| {
        if index < offset {
            Some(index)
        } else if index < offset + count {
            None
        } else {
            Some(index - count)
        }
    }
}
