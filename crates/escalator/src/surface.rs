//! Capability traits for the row container and column configuration
//! surfaces, and the borrowed handles that implement them on an
//! [`Escalator`].
//!
//! Code that only needs one surface (a data source feeding the body, a
//! column chooser) can take `impl RowContainer` / `impl ColumnConfiguration`
//! and be handed either a plain handle or an observing wrapper such as
//! [`crate::Logged`].

use std::collections::BTreeMap;

use escalator_core::{Result, Section};

use crate::columns::ColumnWidth;
use crate::escalator::Escalator;
use crate::pool::RowElement;
use crate::updater::EscalatorUpdater;

/// One section's rows.
pub trait RowContainer {
    fn section(&self) -> Section;

    fn row_count(&self) -> usize;

    /// Insert `count` rows before `offset`.
    fn insert_rows(&mut self, offset: usize, count: usize) -> Result<()>;

    /// Remove rows `offset..offset + count`.
    fn remove_rows(&mut self, offset: usize, count: usize) -> Result<()>;

    /// `update` the materialized rows among `offset..offset + count`.
    fn refresh_rows(&mut self, offset: usize, count: usize) -> Result<()>;

    /// Returns the previous updater.
    fn set_escalator_updater(
        &mut self,
        updater: Box<dyn EscalatorUpdater>,
    ) -> Box<dyn EscalatorUpdater>;

    fn escalator_updater(&self) -> &dyn EscalatorUpdater;

    fn set_default_row_height(&mut self, px: f64) -> Result<()>;

    fn default_row_height(&self) -> f64;

    /// Element bound to row `index`; fails if the row is not materialized.
    fn row_element(&self, index: usize) -> Result<&RowElement>;

    fn section_height(&self) -> f64;
}

/// Column configuration shared by all sections.
pub trait ColumnConfiguration {
    fn column_count(&self) -> usize;

    fn insert_columns(&mut self, offset: usize, count: usize) -> Result<()>;

    fn remove_columns(&mut self, offset: usize, count: usize) -> Result<()>;

    fn refresh_columns(&mut self, offset: usize, count: usize) -> Result<()>;

    fn set_frozen_column_count(&mut self, count: usize) -> Result<()>;

    fn frozen_column_count(&self) -> usize;

    fn set_column_width(&mut self, column: usize, width: ColumnWidth) -> Result<()>;

    fn set_column_widths(&mut self, widths: &BTreeMap<usize, ColumnWidth>) -> Result<()>;

    fn column_width(&self, column: usize) -> Option<ColumnWidth>;

    fn column_width_actual(&self, column: usize) -> Option<f64>;
}

/// Mutable view of one section of an [`Escalator`].
#[derive(Debug)]
pub struct RowSection<'a> {
    escalator: &'a mut Escalator,
    section: Section,
}

impl RowContainer for RowSection<'_> {
    fn section(&self) -> Section {
        self.section
    }

    fn row_count(&self) -> usize {
        self.escalator.row_count(self.section)
    }

    fn insert_rows(&mut self, offset: usize, count: usize) -> Result<()> {
        self.escalator.insert_rows(self.section, offset, count)
    }

    fn remove_rows(&mut self, offset: usize, count: usize) -> Result<()> {
        self.escalator.remove_rows(self.section, offset, count)
    }

    fn refresh_rows(&mut self, offset: usize, count: usize) -> Result<()> {
        self.escalator.refresh_rows(self.section, offset, count)
    }

    fn set_escalator_updater(
        &mut self,
        updater: Box<dyn EscalatorUpdater>,
    ) -> Box<dyn EscalatorUpdater> {
        self.escalator.set_escalator_updater(self.section, updater)
    }

    fn escalator_updater(&self) -> &dyn EscalatorUpdater {
        self.escalator.escalator_updater(self.section)
    }

    fn set_default_row_height(&mut self, px: f64) -> Result<()> {
        self.escalator.set_default_row_height(self.section, px)
    }

    fn default_row_height(&self) -> f64 {
        self.escalator.default_row_height(self.section)
    }

    fn row_element(&self, index: usize) -> Result<&RowElement> {
        self.escalator.row_element(self.section, index)
    }

    fn section_height(&self) -> f64 {
        self.escalator.section_height(self.section)
    }
}

/// Mutable view of an [`Escalator`]'s columns.
#[derive(Debug)]
pub struct ColumnsMut<'a> {
    escalator: &'a mut Escalator,
}

impl ColumnConfiguration for ColumnsMut<'_> {
    fn column_count(&self) -> usize {
        self.escalator.column_count()
    }

    fn insert_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        self.escalator.insert_columns(offset, count)
    }

    fn remove_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        self.escalator.remove_columns(offset, count)
    }

    fn refresh_columns(&mut self, offset: usize, count: usize) -> Result<()> {
        self.escalator.refresh_columns(offset, count)
    }

    fn set_frozen_column_count(&mut self, count: usize) -> Result<()> {
        self.escalator.set_frozen_column_count(count)
    }

    fn frozen_column_count(&self) -> usize {
        self.escalator.frozen_column_count()
    }

    fn set_column_width(&mut self, column: usize, width: ColumnWidth) -> Result<()> {
        self.escalator.set_column_width(column, width)
    }

    fn set_column_widths(&mut self, widths: &BTreeMap<usize, ColumnWidth>) -> Result<()> {
        self.escalator.set_column_widths(widths)
    }

    fn column_width(&self, column: usize) -> Option<ColumnWidth> {
        self.escalator.column_width(column)
    }

    fn column_width_actual(&self, column: usize) -> Option<f64> {
        self.escalator.column_width_actual(column)
    }
}

impl Escalator {
    /// Handle for `section`.
    pub fn section(&mut self, section: Section) -> RowSection<'_> {
        RowSection {
            escalator: self,
            section,
        }
    }

    pub fn header(&mut self) -> RowSection<'_> {
        self.section(Section::Header)
    }

    pub fn body(&mut self) -> RowSection<'_> {
        self.section(Section::Body)
    }

    pub fn footer(&mut self) -> RowSection<'_> {
        self.section(Section::Footer)
    }

    pub fn columns(&mut self) -> ColumnsMut<'_> {
        ColumnsMut { escalator: self }
    }
}
