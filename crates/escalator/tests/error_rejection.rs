//! Rejected mutations: the right error class, and nothing changed.

use std::collections::BTreeMap;

use escalator::{
    ColumnWidth, CoordinateUpdater, ErrorKind, Escalator, EscalatorConfig, EscalatorError,
    LifecycleLog, RecordingUpdater, ScrollDestination, Section,
};

/// Observable state that a rejected call must not change.
#[derive(Debug, PartialEq)]
struct Fingerprint {
    rows: [usize; 3],
    columns: usize,
    frozen: usize,
    widths: Vec<Option<f64>>,
    window: (usize, usize),
    scroll: (f64, f64),
    spacers: Vec<(usize, f64)>,
}

fn fingerprint(escalator: &Escalator) -> Fingerprint {
    let window = escalator.materialized_row_range(Section::Body);
    Fingerprint {
        rows: Section::ALL.map(|section| escalator.row_count(section)),
        columns: escalator.column_count(),
        frozen: escalator.frozen_column_count(),
        widths: (0..escalator.column_count())
            .map(|column| escalator.column_width_actual(column))
            .collect(),
        window: (window.start(), window.end()),
        scroll: (escalator.scroll_left(), escalator.scroll_top()),
        spacers: escalator
            .spacers()
            .map(|spacer| (spacer.row(), spacer.height()))
            .collect(),
    }
}

fn fixture() -> (Escalator, LifecycleLog) {
    let log = LifecycleLog::new();
    let mut escalator = Escalator::new(EscalatorConfig::default()).unwrap();
    escalator.set_escalator_updater(
        Section::Body,
        Box::new(RecordingUpdater::new(CoordinateUpdater, log.clone())),
    );
    escalator.insert_columns(0, 12).unwrap();
    escalator.insert_rows(Section::Header, 0, 1).unwrap();
    escalator.insert_rows(Section::Body, 0, 100).unwrap();
    escalator.set_frozen_column_count(2).unwrap();
    escalator.set_spacer(4, 30.0).unwrap();
    escalator.set_scroll_top(120.0);
    escalator.set_scroll_left(150.0);
    log.clear();
    (escalator, log)
}

fn assert_rejected(
    kind: ErrorKind,
    mutation: impl FnOnce(&mut Escalator) -> escalator::Result<()>,
) -> EscalatorError {
    let (mut escalator, log) = fixture();
    let before = fingerprint(&escalator);
    let err = mutation(&mut escalator).unwrap_err();
    assert_eq!(err.kind(), kind, "{err}");
    assert_eq!(fingerprint(&escalator), before, "{err}");
    assert!(log.is_empty(), "{err} fired callbacks");
    err
}

// ============================================================================
// Out of bounds
// ============================================================================

#[test]
fn row_ranges_out_of_bounds() {
    let err = assert_rejected(ErrorKind::OutOfBounds, |e| e.insert_rows(Section::Body, 101, 1));
    assert_eq!(
        err,
        EscalatorError::RowOffsetOutOfBounds {
            section: Section::Body,
            offset: 101,
            row_count: 100
        }
    );
    assert_rejected(ErrorKind::OutOfBounds, |e| e.remove_rows(Section::Body, 95, 6));
    assert_rejected(ErrorKind::OutOfBounds, |e| e.remove_rows(Section::Footer, 0, 1));
    assert_rejected(ErrorKind::OutOfBounds, |e| e.refresh_rows(Section::Header, 1, 1));
    assert_rejected(ErrorKind::OutOfBounds, |e| {
        e.remove_rows(Section::Body, usize::MAX, 2)
    });
}

#[test]
fn column_ranges_out_of_bounds() {
    assert_rejected(ErrorKind::OutOfBounds, |e| e.insert_columns(13, 1));
    assert_rejected(ErrorKind::OutOfBounds, |e| e.remove_columns(10, 3));
    assert_rejected(ErrorKind::OutOfBounds, |e| e.refresh_columns(12, 1));
}

#[test]
fn scroll_targets_out_of_bounds() {
    assert_rejected(ErrorKind::OutOfBounds, |e| {
        e.scroll_to_row(100, ScrollDestination::Any, 0.0)
    });
    assert_rejected(ErrorKind::OutOfBounds, |e| {
        e.scroll_to_column(12, ScrollDestination::Start, 0.0)
    });
}

#[test]
fn unmaterialized_row_is_a_state_error() {
    let (escalator, _log) = fixture();
    let err = escalator.row_element(Section::Body, 90).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalState);
    let err = escalator.row_element(Section::Body, 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
}

// ============================================================================
// Invalid arguments
// ============================================================================

#[test]
fn zero_counts() {
    assert_rejected(ErrorKind::InvalidArgument, |e| e.insert_rows(Section::Body, 0, 0));
    assert_rejected(ErrorKind::InvalidArgument, |e| e.remove_rows(Section::Body, 0, 0));
    assert_rejected(ErrorKind::InvalidArgument, |e| e.insert_columns(0, 0));
    assert_rejected(ErrorKind::InvalidArgument, |e| e.refresh_columns(0, 0));
}

#[test]
fn offset_is_checked_before_count_on_insert() {
    let err = assert_rejected(ErrorKind::OutOfBounds, |e| e.insert_columns(40, 0));
    assert!(matches!(err, EscalatorError::ColumnOffsetOutOfBounds { .. }));
    // Removal checks the count first.
    let err = assert_rejected(ErrorKind::InvalidArgument, |e| e.remove_columns(40, 0));
    assert_eq!(err, EscalatorError::ZeroCount { what: "columns" });
}

#[test]
fn bad_widths_reject_the_whole_map() {
    assert_rejected(ErrorKind::InvalidArgument, |e| {
        e.set_column_width(3, ColumnWidth::Fixed(-1.0))
    });
    assert_rejected(ErrorKind::InvalidArgument, |e| {
        e.set_column_width(12, ColumnWidth::Fixed(10.0))
    });
    let err = assert_rejected(ErrorKind::InvalidArgument, |e| {
        let mut widths = BTreeMap::new();
        widths.insert(0, ColumnWidth::Fixed(40.0));
        widths.insert(5, ColumnWidth::Fixed(f64::NAN));
        e.set_column_widths(&widths)
    });
    assert!(matches!(err, EscalatorError::InvalidWidth { index: 5, .. }));
}

#[test]
fn frozen_and_scroll_arguments() {
    assert_rejected(ErrorKind::InvalidArgument, |e| e.set_frozen_column_count(13));
    assert_rejected(ErrorKind::InvalidArgument, |e| {
        e.scroll_to_column(1, ScrollDestination::Start, 0.0)
    });
    assert_rejected(ErrorKind::InvalidArgument, |e| {
        e.scroll_to_row(10, ScrollDestination::Middle, 4.0)
    });
}

#[test]
fn dimensions_and_spacers() {
    assert_rejected(ErrorKind::InvalidArgument, |e| e.set_size(-1.0, 100.0));
    assert_rejected(ErrorKind::InvalidArgument, |e| e.set_size(100.0, f64::INFINITY));
    assert_rejected(ErrorKind::InvalidArgument, |e| {
        e.set_default_row_height(Section::Body, 0.0)
    });
    assert_rejected(ErrorKind::InvalidArgument, |e| e.set_spacer(100, 10.0));
    assert_rejected(ErrorKind::InvalidArgument, |e| e.set_spacer(3, f64::NAN));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = EscalatorConfig::default().with_row_height(Section::Footer, 0.0);
    let err = Escalator::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
