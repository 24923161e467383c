#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! Every fallible Escalator operation validates its arguments before touching
//! any state, so an `Err` always means "nothing changed". Each error maps to
//! one of three [`ErrorKind`]s:
//!
//! - [`ErrorKind::OutOfBounds`]: an offset or index outside the valid range.
//! - [`ErrorKind::InvalidArgument`]: a malformed argument (zero count,
//!   negative width, frozen count larger than the column count, ...).
//! - [`ErrorKind::IllegalState`]: the request is well-formed but the current
//!   state cannot satisfy it (e.g. asking for the element of a row that is not
//!   materialized).

use std::fmt;

pub use crate::section::Section;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, EscalatorError>;

/// Coarse classification of an [`EscalatorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfBounds,
    InvalidArgument,
    IllegalState,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfBounds => "out-of-bounds",
            Self::InvalidArgument => "invalid-argument",
            Self::IllegalState => "illegal-state",
        }
    }
}

/// Structured reasons an Escalator operation was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalatorError {
    /// Insert offset outside `0..=row_count`.
    RowOffsetOutOfBounds {
        section: Section,
        offset: usize,
        row_count: usize,
    },
    /// Row range not contained in `0..row_count`.
    RowRangeOutOfBounds {
        section: Section,
        offset: usize,
        count: usize,
        row_count: usize,
    },
    /// Single row index not in `0..row_count`.
    RowIndexOutOfBounds {
        section: Section,
        index: usize,
        row_count: usize,
    },
    /// Insert offset outside `0..=column_count`.
    ColumnOffsetOutOfBounds { offset: usize, column_count: usize },
    /// Column range not contained in `0..column_count`.
    ColumnRangeOutOfBounds {
        offset: usize,
        count: usize,
        column_count: usize,
    },
    /// Single column index not in `0..column_count` (scrolling).
    ColumnIndexOutOfBounds { index: usize, column_count: usize },
    /// A structural mutation was asked to touch zero rows or columns.
    ZeroCount { what: &'static str },
    /// A width setter referenced a column that does not exist.
    ColumnNotFound { index: usize, column_count: usize },
    /// A width was negative, NaN or infinite.
    InvalidWidth { index: usize, width: f64 },
    /// A size, row height or row count was out of its valid domain.
    InvalidDimension { what: &'static str, value: f64 },
    /// Frozen column count larger than the column count.
    FrozenCountTooLarge { count: usize, column_count: usize },
    /// Horizontal scrolling cannot target a frozen column.
    FrozenColumnTarget { index: usize, frozen_count: usize },
    /// `Middle` scroll destinations do not accept padding.
    PaddingWithMiddle { padding: f64 },
    /// A spacer was requested for a row that does not exist.
    InvalidSpacerRow { row: usize, row_count: usize },
    /// A spacer-targeted scroll named a row without a spacer.
    NoSpacer { row: usize },
    /// The row exists but no screen element is bound to it.
    RowNotMaterialized { section: Section, index: usize },
}

impl EscalatorError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RowOffsetOutOfBounds { .. }
            | Self::RowRangeOutOfBounds { .. }
            | Self::RowIndexOutOfBounds { .. }
            | Self::ColumnOffsetOutOfBounds { .. }
            | Self::ColumnRangeOutOfBounds { .. }
            | Self::ColumnIndexOutOfBounds { .. } => ErrorKind::OutOfBounds,
            Self::ZeroCount { .. }
            | Self::ColumnNotFound { .. }
            | Self::InvalidWidth { .. }
            | Self::InvalidDimension { .. }
            | Self::FrozenCountTooLarge { .. }
            | Self::FrozenColumnTarget { .. }
            | Self::PaddingWithMiddle { .. }
            | Self::InvalidSpacerRow { .. }
            | Self::NoSpacer { .. } => ErrorKind::InvalidArgument,
            Self::RowNotMaterialized { .. } => ErrorKind::IllegalState,
        }
    }
}

impl fmt::Display for EscalatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowOffsetOutOfBounds {
                section,
                offset,
                row_count,
            } => write!(
                f,
                "{section} row offset {offset} is outside 0..={row_count}"
            ),
            Self::RowRangeOutOfBounds {
                section,
                offset,
                count,
                row_count,
            } => write!(
                f,
                "{section} row range {offset}..{} is outside the current {row_count} rows",
                offset.saturating_add(*count)
            ),
            Self::RowIndexOutOfBounds {
                section,
                index,
                row_count,
            } => write!(
                f,
                "{section} row {index} does not exist ({row_count} rows)"
            ),
            Self::ColumnOffsetOutOfBounds {
                offset,
                column_count,
            } => write!(f, "column offset {offset} is outside 0..={column_count}"),
            Self::ColumnRangeOutOfBounds {
                offset,
                count,
                column_count,
            } => write!(
                f,
                "column range {offset}..{} is outside the current {column_count} columns",
                offset.saturating_add(*count)
            ),
            Self::ColumnIndexOutOfBounds {
                index,
                column_count,
            } => write!(f, "column {index} does not exist ({column_count} columns)"),
            Self::ZeroCount { what } => write!(f, "number of {what} must be 1 or greater"),
            Self::ColumnNotFound {
                index,
                column_count,
            } => write!(
                f,
                "cannot set the width of column {index}: only {column_count} columns exist"
            ),
            Self::InvalidWidth { index, width } => {
                write!(f, "width of column {index} must be >= 0 (got {width})")
            }
            Self::InvalidDimension { what, value } => {
                write!(f, "invalid {what}: {value}")
            }
            Self::FrozenCountTooLarge {
                count,
                column_count,
            } => write!(
                f,
                "frozen column count {count} exceeds the current {column_count} columns"
            ),
            Self::FrozenColumnTarget {
                index,
                frozen_count,
            } => write!(
                f,
                "column {index} is frozen (first {frozen_count} columns) and cannot be scrolled to"
            ),
            Self::PaddingWithMiddle { padding } => {
                write!(f, "a middle scroll destination cannot have padding (got {padding})")
            }
            Self::InvalidSpacerRow { row, row_count } => write!(
                f,
                "invalid spacer row {row}: the body only has {row_count} rows"
            ),
            Self::NoSpacer { row } => write!(f, "no spacer is open at row {row}"),
            Self::RowNotMaterialized { section, index } => write!(
                f,
                "{section} row {index} is not currently materialized"
            ),
        }
    }
}

impl std::error::Error for EscalatorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let oob = EscalatorError::RowRangeOutOfBounds {
            section: Section::Body,
            offset: 5,
            count: 10,
            row_count: 8,
        };
        assert_eq!(oob.kind(), ErrorKind::OutOfBounds);

        let arg = EscalatorError::FrozenCountTooLarge {
            count: 4,
            column_count: 3,
        };
        assert_eq!(arg.kind(), ErrorKind::InvalidArgument);

        let state = EscalatorError::RowNotMaterialized {
            section: Section::Body,
            index: 90,
        };
        assert_eq!(state.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn display_mentions_range() {
        let err = EscalatorError::RowRangeOutOfBounds {
            section: Section::Footer,
            offset: 2,
            count: 3,
            row_count: 4,
        };
        let text = err.to_string();
        assert!(text.contains("footer"), "{text}");
        assert!(text.contains("2..5"), "{text}");
    }

    #[test]
    fn width_setter_index_errors_are_argument_errors() {
        let err = EscalatorError::ColumnNotFound {
            index: 12,
            column_count: 10,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.kind().as_str(), "invalid-argument");
    }
}
