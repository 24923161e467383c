#![forbid(unsafe_code)]

//! Virtualized table-rendering core.
//!
//! An [`Escalator`] presents an arbitrarily large grid (header, body and
//! footer rows over a shared set of columns) through a small pool of
//! render targets. Only the rows and columns near the viewport are
//! materialized; the rest exist as logical indices. Callers populate
//! materialized cells through an [`EscalatorUpdater`], which is driven
//! through a strict attach / update / detach lifecycle.
//!
//! ```
//! use escalator::{CoordinateUpdater, Escalator, EscalatorConfig, Section};
//!
//! let mut table = Escalator::new(EscalatorConfig::default()).unwrap();
//! table.set_escalator_updater(Section::Body, Box::new(CoordinateUpdater));
//! table.insert_columns(0, 10).unwrap();
//! table.insert_rows(Section::Body, 0, 1_000).unwrap();
//!
//! let row = table.row_element(Section::Body, 3).unwrap();
//! assert_eq!(row.cell(2).map(|cell| cell.content()), Some("3:2"));
//! assert!(table.row_element(Section::Body, 900).is_err());
//! ```

pub mod columns;
pub mod escalator;
pub mod fenwick;
pub mod observe;
pub mod pool;
pub mod row_container;
pub mod spacer;
pub mod surface;
pub mod updater;
pub mod viewport;

pub use columns::{ColumnSet, ColumnWidth};
pub use escalator::{Escalator, ListenerId};
pub use observe::{
    LifecycleEvent, LifecycleLog, LifecyclePhase, Logged, RecordingSpacerUpdater, RecordingUpdater,
};
pub use pool::{ElementId, RowElement};
pub use row_container::Convergence;
pub use spacer::SpacerElement;
pub use surface::{ColumnConfiguration, ColumnsMut, RowContainer, RowSection};
pub use updater::{
    CellElement, CellSnapshot, Cells, CoordinateUpdater, EscalatorUpdater, FlyweightCell,
    NullSpacerUpdater, NullUpdater, RowInfo, SpacerUpdater,
};
pub use viewport::{ScrollAxis, ScrollDestination, scroll_pos};

pub use escalator_core::{
    ErrorKind, EscalatorConfig, EscalatorError, HeightMode, IndexRange, Result, Section,
};
