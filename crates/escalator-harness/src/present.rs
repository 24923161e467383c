//! Plain-text rendering of an Escalator's materialized state.
//!
//! The text is line-oriented and deterministic so it can be diffed and
//! checksummed:
//!
//! ```text
//! table 300x100 scroll 0,0 columns 2 frozen 0 window 0..2
//! header rows 1 window 0..1
//!   0 top 0 | 0@0 "0:0" | 1@100 "0:1"
//! body rows 2 window 0..2
//!   0 top 0 | 0@0 "0:0" | 1@100 "0:1"
//!   1 top 20 | 0@0 "1:0" | 1@100 "1:1"
//! footer rows 0 window 0..0
//! ```
//!
//! Frozen cells are prefixed with `*`, the last frozen cell with `*|`.
//! Spacers of materialized body rows follow their row as `~ spacer` lines.

use std::fmt::Write as _;

use escalator::{CellElement, Escalator, RowElement, Section};

/// Render the whole table as text.
#[must_use]
pub fn table_to_text(escalator: &Escalator) -> String {
    let mut out = String::new();
    let columns = escalator.materialized_columns();
    let _ = writeln!(
        out,
        "table {}x{} scroll {},{} columns {} frozen {} window {}",
        escalator.width(),
        escalator.height(),
        escalator.scroll_left(),
        escalator.scroll_top(),
        escalator.column_count(),
        columns.frozen,
        columns.window,
    );
    for section in Section::ALL {
        section_to_text(&mut out, escalator, section);
    }
    out
}

fn section_to_text(out: &mut String, escalator: &Escalator, section: Section) {
    let _ = writeln!(
        out,
        "{section} rows {} window {}",
        escalator.row_count(section),
        escalator.materialized_row_range(section),
    );
    for row in escalator.materialized_rows(section) {
        row_to_text(out, row);
        if section != Section::Body {
            continue;
        }
        let Some(index) = row.index() else { continue };
        if let (Some(spacer), Some(top)) = (escalator.spacer(index), escalator.spacer_top(index)) {
            let _ = writeln!(
                out,
                "  ~ spacer {index} top {top} h {} {:?}",
                spacer.height(),
                spacer.content()
            );
        }
    }
}

fn row_to_text(out: &mut String, row: &RowElement) {
    let index = row.index().map_or_else(|| "-".to_string(), |i| i.to_string());
    let _ = write!(out, "  {index} top {}", row.top());
    for cell in row.cells() {
        out.push_str(" | ");
        cell_to_text(out, cell);
    }
    out.push('\n');
}

fn cell_to_text(out: &mut String, cell: &CellElement) {
    if cell.is_last_frozen() {
        out.push_str("*|");
    } else if cell.is_frozen() {
        out.push('*');
    }
    let _ = write!(
        out,
        "{}@{} {:?}",
        cell.column(),
        cell.screen_left(),
        cell.content()
    );
}
