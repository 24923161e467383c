//! Observing wrappers.
//!
//! [`Logged`] wraps anything implementing [`RowContainer`] or
//! [`ColumnConfiguration`] and emits a structured event per call.
//! [`RecordingUpdater`] and [`RecordingSpacerUpdater`] wrap updaters and
//! append every lifecycle hook to a shared [`LifecycleLog`], which is what the
//! lifecycle ordering tests and the harness JSONL output are built on.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use escalator_core::{Result, Section};

use crate::columns::ColumnWidth;
use crate::pool::{ElementId, RowElement};
use crate::spacer::SpacerElement;
use crate::surface::{ColumnConfiguration, RowContainer};
use crate::updater::{Cells, EscalatorUpdater, NullSpacerUpdater, NullUpdater, RowInfo, SpacerUpdater};

// ════════════════════════════════════════════════════════════════════════
// Logged
// ════════════════════════════════════════════════════════════════════════

/// Forwards to `inner` and logs every mutation with its outcome.
#[derive(Debug)]
pub struct Logged<T> {
    inner: T,
}

impl<T> Logged<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn outcome(result: &Result<()>) -> &'static str {
    match result {
        Ok(()) => "ok",
        Err(err) => err.kind().as_str(),
    }
}

impl<T: RowContainer> RowContainer for Logged<T> {
    fn section(&self) -> Section {
        self.inner.section()
    }

    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    fn insert_rows(&mut self, offset: usize, count: usize) -> Result<()> {
        let result = self.inner.insert_rows(offset, count);
        escalator_core::info!(
            section = self.inner.section().as_str(),
            offset,
            count,
            row_count = self.inner.row_count(),
            outcome = outcome(&result),
            "insert_rows"
        );
        result
    }

    fn remove_rows(&mut self, offset: usize, count: usize) -> Result<()> {
        let result = self.inner.remove_rows(offset, count);
        escalator_core::info!(
            section = self.inner.section().as_str(),
            offset,
            count,
            row_count = self.inner.row_count(),
            outcome = outcome(&result),
            "remove_rows"
        );
        result
    }

    fn refresh_rows(&mut self, offset: usize, count: usize) -> Result<()> {
        let result = self.inner.refresh_rows(offset, count);
        escalator_core::debug!(
            section = self.inner.section().as_str(),
            offset,
            count,
            outcome = outcome(&result),
            "refresh_rows"
        );
        result
    }

    fn set_escalator_updater(
        &mut self,
        updater: Box<dyn EscalatorUpdater>,
    ) -> Box<dyn EscalatorUpdater> {
        escalator_core::info!(section = self.inner.section().as_str(), "set_escalator_updater");
        self.inner.set_escalator_updater(updater)
    }

    fn escalator_updater(&self) -> &dyn EscalatorUpdater {
        self.inner.escalator_updater()
    }

    fn set_default_row_height(&mut self, px: f64) -> Result<()> {
        let result = self.inner.set_default_row_height(px);
        escalator_core::info!(
            section = self.inner.section().as_str(),
            px,
            outcome = outcome(&result),
            "set_default_row_height"
        );
        result
    }

    fn default_row_height(&self) -> f64 {
        self.inner.default_row_height()
    }

    fn row_element(&self, index: usize) -> Result<&RowElement> {
        self.inner.row_element(index)
    }

    fn section_height(&self) -> f64 {
        self.inner.section_height()
    }
}

impl<T: ColumnConfiguration> ColumnConfiguration for Logged<T> {
    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn insert_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        let result = self.inner.insert_columns(offset, count);
        escalator_core::info!(
            offset,
            count,
            column_count = self.inner.column_count(),
            outcome = outcome(&result),
            "insert_columns"
        );
        result
    }

    fn remove_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        let result = self.inner.remove_columns(offset, count);
        escalator_core::info!(
            offset,
            count,
            column_count = self.inner.column_count(),
            outcome = outcome(&result),
            "remove_columns"
        );
        result
    }

    fn refresh_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        let result = self.inner.refresh_columns(offset, count);
        escalator_core::debug!(offset, count, outcome = outcome(&result), "refresh_columns");
        result
    }

    fn set_frozen_column_count(&mut self, count: usize) -> Result<()> {
        let result = self.inner.set_frozen_column_count(count);
        escalator_core::info!(count, outcome = outcome(&result), "set_frozen_column_count");
        result
    }

    fn frozen_column_count(&self) -> usize {
        self.inner.frozen_column_count()
    }

    fn set_column_width(&mut self, column: usize, width: ColumnWidth) -> Result<()> {
        let result = self.inner.set_column_width(column, width);
        escalator_core::info!(
            column,
            width = ?width,
            outcome = outcome(&result),
            "set_column_width"
        );
        result
    }

    fn set_column_widths(&mut self, widths: &BTreeMap<usize, ColumnWidth>) -> Result<()> {
        let result = self.inner.set_column_widths(widths);
        escalator_core::info!(
            columns = widths.len(),
            outcome = outcome(&result),
            "set_column_widths"
        );
        result
    }

    fn column_width(&self, column: usize) -> Option<ColumnWidth> {
        self.inner.column_width(column)
    }

    fn column_width_actual(&self, column: usize) -> Option<f64> {
        self.inner.column_width_actual(column)
    }
}

// ════════════════════════════════════════════════════════════════════════
// Lifecycle recording
// ════════════════════════════════════════════════════════════════════════

/// Which hook produced a [`LifecycleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    PreAttach,
    PostAttach,
    Update,
    PreDetach,
    PostDetach,
    SpacerInit,
    SpacerDestroy,
}

impl LifecyclePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreAttach => "pre_attach",
            Self::PostAttach => "post_attach",
            Self::Update => "update",
            Self::PreDetach => "pre_detach",
            Self::PostDetach => "post_detach",
            Self::SpacerInit => "spacer_init",
            Self::SpacerDestroy => "spacer_destroy",
        }
    }

    #[must_use]
    pub const fn is_detach(self) -> bool {
        matches!(self, Self::PreDetach | Self::PostDetach)
    }

    #[must_use]
    pub const fn is_attach(self) -> bool {
        matches!(self, Self::PreAttach | Self::PostAttach)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded hook call.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    pub phase: LifecyclePhase,
    pub section: Section,
    /// Logical row (the anchor row for spacer events).
    pub row: usize,
    /// Pooled element; `None` for spacer events.
    pub element: Option<ElementId>,
    pub attached: bool,
    /// Columns of the cells handed to the hook.
    pub columns: Vec<usize>,
}

/// Shared, append-only list of lifecycle events.
#[derive(Debug, Clone, Default)]
pub struct LifecycleLog(Rc<RefCell<Vec<LifecycleEvent>>>);

impl LifecycleLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: LifecycleEvent) {
        self.0.borrow_mut().push(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copy of every event so far.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.0.borrow().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Phases observed for one row, in call order.
    #[must_use]
    pub fn phases_for(&self, section: Section, row: usize) -> Vec<LifecyclePhase> {
        self.0
            .borrow()
            .iter()
            .filter(|event| event.section == section && event.row == row)
            .map(|event| event.phase)
            .collect()
    }

    /// Number of events with `phase`.
    #[must_use]
    pub fn count(&self, phase: LifecyclePhase) -> usize {
        self.0.borrow().iter().filter(|event| event.phase == phase).count()
    }
}

/// Forwards to `inner` after recording each hook.
#[derive(Debug)]
pub struct RecordingUpdater<U = NullUpdater> {
    inner: U,
    log: LifecycleLog,
}

impl<U> RecordingUpdater<U> {
    pub fn new(inner: U, log: LifecycleLog) -> Self {
        Self { inner, log }
    }

    pub fn inner(&self) -> &U {
        &self.inner
    }

    pub fn log(&self) -> &LifecycleLog {
        &self.log
    }

    fn record(&self, phase: LifecyclePhase, row: &RowInfo, cells: &Cells<'_>) {
        self.log.push(LifecycleEvent {
            phase,
            section: row.section,
            row: row.index,
            element: Some(row.element),
            attached: row.attached,
            columns: cells.columns(),
        });
    }
}

impl<U: EscalatorUpdater> EscalatorUpdater for RecordingUpdater<U> {
    fn pre_attach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        self.record(LifecyclePhase::PreAttach, row, &cells);
        self.inner.pre_attach(row, cells);
    }

    fn post_attach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        self.record(LifecyclePhase::PostAttach, row, &cells);
        self.inner.post_attach(row, cells);
    }

    fn update(&mut self, row: &RowInfo, cells: Cells<'_>) {
        self.record(LifecyclePhase::Update, row, &cells);
        self.inner.update(row, cells);
    }

    fn pre_detach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        self.record(LifecyclePhase::PreDetach, row, &cells);
        self.inner.pre_detach(row, cells);
    }

    fn post_detach(&mut self, row: &RowInfo, cells: Cells<'_>) {
        self.record(LifecyclePhase::PostDetach, row, &cells);
        self.inner.post_detach(row, cells);
    }
}

/// Spacer counterpart of [`RecordingUpdater`].
#[derive(Debug)]
pub struct RecordingSpacerUpdater<U = NullSpacerUpdater> {
    inner: U,
    log: LifecycleLog,
}

impl<U> RecordingSpacerUpdater<U> {
    pub fn new(inner: U, log: LifecycleLog) -> Self {
        Self { inner, log }
    }

    fn record(&self, phase: LifecyclePhase, spacer: &SpacerElement) {
        self.log.push(LifecycleEvent {
            phase,
            section: Section::Body,
            row: spacer.row(),
            element: None,
            attached: true,
            columns: Vec::new(),
        });
    }
}

impl<U: SpacerUpdater> SpacerUpdater for RecordingSpacerUpdater<U> {
    fn init(&mut self, spacer: &mut SpacerElement) {
        self.record(LifecyclePhase::SpacerInit, spacer);
        self.inner.init(spacer);
    }

    fn destroy(&mut self, spacer: &mut SpacerElement) {
        self.record(LifecyclePhase::SpacerDestroy, spacer);
        self.inner.destroy(spacer);
    }
}
