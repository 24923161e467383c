//! Line-based scenario scripts and their replay.
//!
//! One command per line; blank lines and lines starting with `#` are
//! ignored.
//!
//! ```text
//! size 800 400
//! columns insert 0 10
//! rows body insert 0 100
//! frozen 1
//! width 0 auto
//! scroll-left 200
//! scroll-to-row 50 middle
//! spacer 3 50
//! snapshot
//! ```

use std::error::Error;
use std::fmt;

use escalator::{
    ColumnWidth, CoordinateUpdater, Escalator, EscalatorConfig, EscalatorError, LifecycleLog,
    NullSpacerUpdater, RecordingSpacerUpdater, RecordingUpdater, ScrollDestination, Section,
};

use crate::golden::{EventLog, compute_text_checksum};
use crate::present::table_to_text;

/// Row or column range operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Insert,
    Remove,
    Refresh,
}

impl RangeOp {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "insert" => Some(Self::Insert),
            "remove" => Some(Self::Remove),
            "refresh" => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// What a `scroll-to-*` command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Row,
    Spacer,
    RowAndSpacer,
    Column,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Size {
        width: f64,
        height: f64,
    },
    Columns {
        op: RangeOp,
        offset: usize,
        count: usize,
    },
    Rows {
        section: Section,
        op: RangeOp,
        offset: usize,
        count: usize,
    },
    Frozen(usize),
    Width {
        column: usize,
        width: ColumnWidth,
    },
    RowHeight {
        section: Section,
        px: f64,
    },
    HeightByRows(f64),
    ScrollTop(f64),
    ScrollLeft(f64),
    ScrollTo {
        target: ScrollTarget,
        index: usize,
        destination: ScrollDestination,
        padding: f64,
    },
    Spacer {
        row: usize,
        height: f64,
    },
    Snapshot,
}

/// A parsed command with its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub line: usize,
    pub source: String,
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub steps: Vec<Step>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptErrorKind {
    /// The line is not a valid command.
    Syntax(String),
    /// The Escalator rejected the command.
    Rejected(EscalatorError),
}

/// A script failure tied to its source line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub line: usize,
    pub kind: ScriptErrorKind,
}

impl ScriptError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            kind: ScriptErrorKind::Syntax(message.into()),
        }
    }

    /// Stable class name used in the event log.
    #[must_use]
    pub fn kind_str(&self) -> &'static str {
        match &self.kind {
            ScriptErrorKind::Syntax(_) => "syntax",
            ScriptErrorKind::Rejected(err) => err.kind().as_str(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ScriptErrorKind::Syntax(message) => write!(f, "line {}: {message}", self.line),
            ScriptErrorKind::Rejected(err) => write!(f, "line {}: {err}", self.line),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ScriptErrorKind::Syntax(_) => None,
            ScriptErrorKind::Rejected(err) => Some(err),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a whole script, stopping at the first bad line.
pub fn parse(source: &str) -> Result<Script, ScriptError> {
    let mut steps = Vec::new();
    for (at, raw) in source.lines().enumerate() {
        let line = at + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let command = parse_command(text).map_err(|message| ScriptError::syntax(line, message))?;
        steps.push(Step {
            line,
            source: text.to_string(),
            command,
        });
    }
    Ok(Script { steps })
}

/// Parse one non-empty command line.
pub fn parse_command(text: &str) -> Result<Command, String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Err("empty command".to_string());
    };
    let command = match name {
        "size" => {
            expect_args(name, args, 2)?;
            Command::Size {
                width: number(args[0])?,
                height: number(args[1])?,
            }
        }
        "columns" => {
            expect_args(name, args, 3)?;
            Command::Columns {
                op: range_op(args[0])?,
                offset: index(args[1])?,
                count: index(args[2])?,
            }
        }
        "rows" => {
            expect_args(name, args, 4)?;
            Command::Rows {
                section: section(args[0])?,
                op: range_op(args[1])?,
                offset: index(args[2])?,
                count: index(args[3])?,
            }
        }
        "frozen" => {
            expect_args(name, args, 1)?;
            Command::Frozen(index(args[0])?)
        }
        "width" => {
            expect_args(name, args, 2)?;
            let width = if args[1] == "auto" {
                ColumnWidth::Auto
            } else {
                ColumnWidth::Fixed(number(args[1])?)
            };
            Command::Width {
                column: index(args[0])?,
                width,
            }
        }
        "row-height" => {
            expect_args(name, args, 2)?;
            Command::RowHeight {
                section: section(args[0])?,
                px: number(args[1])?,
            }
        }
        "height-by-rows" => {
            expect_args(name, args, 1)?;
            Command::HeightByRows(number(args[0])?)
        }
        "scroll-top" => {
            expect_args(name, args, 1)?;
            Command::ScrollTop(number(args[0])?)
        }
        "scroll-left" => {
            expect_args(name, args, 1)?;
            Command::ScrollLeft(number(args[0])?)
        }
        "scroll-to-row" => scroll_to(name, ScrollTarget::Row, args)?,
        "scroll-to-spacer" => scroll_to(name, ScrollTarget::Spacer, args)?,
        "scroll-to-row-and-spacer" => scroll_to(name, ScrollTarget::RowAndSpacer, args)?,
        "scroll-to-column" => scroll_to(name, ScrollTarget::Column, args)?,
        "spacer" => {
            expect_args(name, args, 2)?;
            Command::Spacer {
                row: index(args[0])?,
                height: number(args[1])?,
            }
        }
        "snapshot" => {
            expect_args(name, args, 0)?;
            Command::Snapshot
        }
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(command)
}

fn expect_args(name: &str, args: &[&str], count: usize) -> Result<(), String> {
    if args.len() == count {
        Ok(())
    } else {
        Err(format!(
            "`{name}` takes {count} argument(s), got {}",
            args.len()
        ))
    }
}

/// `<index> [destination [padding]]`
fn scroll_to(name: &str, target: ScrollTarget, args: &[&str]) -> Result<Command, String> {
    if args.is_empty() || args.len() > 3 {
        return Err(format!("`{name}` takes 1 to 3 arguments, got {}", args.len()));
    }
    let destination = match args.get(1) {
        Some(word) => ScrollDestination::parse(word)
            .ok_or_else(|| format!("unknown scroll destination `{word}`"))?,
        None => ScrollDestination::Any,
    };
    let padding = match args.get(2) {
        Some(word) => number(word)?,
        None => 0.0,
    };
    Ok(Command::ScrollTo {
        target,
        index: index(args[0])?,
        destination,
        padding,
    })
}

fn number(word: &str) -> Result<f64, String> {
    word.parse::<f64>()
        .map_err(|_| format!("`{word}` is not a number"))
}

fn index(word: &str) -> Result<usize, String> {
    word.parse::<usize>()
        .map_err(|_| format!("`{word}` is not a non-negative integer"))
}

fn section(word: &str) -> Result<Section, String> {
    Section::parse(word).ok_or_else(|| format!("unknown section `{word}`"))
}

fn range_op(word: &str) -> Result<RangeOp, String> {
    RangeOp::parse(word).ok_or_else(|| format!("expected insert, remove or refresh, got `{word}`"))
}

// ============================================================================
// Replay
// ============================================================================

/// An Escalator with recording updaters on every section and on spacers.
///
/// Cells are filled with `"{row}:{column}"`.
#[derive(Debug)]
pub struct Replay {
    escalator: Escalator,
    log: LifecycleLog,
    snapshots: Vec<String>,
}

impl Replay {
    pub fn new(config: EscalatorConfig) -> Result<Self, EscalatorError> {
        let log = LifecycleLog::new();
        let mut escalator = Escalator::new(config)?;
        for section in Section::ALL {
            escalator.set_escalator_updater(
                section,
                Box::new(RecordingUpdater::new(CoordinateUpdater, log.clone())),
            );
        }
        escalator.set_spacer_updater(Box::new(RecordingSpacerUpdater::new(
            NullSpacerUpdater,
            log.clone(),
        )));
        Ok(Self {
            escalator,
            log,
            snapshots: Vec::new(),
        })
    }

    #[must_use]
    pub fn escalator(&self) -> &Escalator {
        &self.escalator
    }

    /// Text of every `snapshot` taken so far.
    #[must_use]
    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }

    /// Run every step, logging commands, hook calls and snapshot checksums.
    /// Stops at the first rejected command.
    pub fn run(&mut self, script: &Script, events: &mut EventLog) -> Result<(), ScriptError> {
        for step in &script.steps {
            events.log_command(step.line, &step.source);
            let result = self.apply(&step.command);
            for event in self.log.take() {
                events.log_lifecycle(step.line, &event);
            }
            if let Err(err) = result {
                let err = ScriptError {
                    line: step.line,
                    kind: ScriptErrorKind::Rejected(err),
                };
                events.log_error(step.line, err.kind_str(), &err.to_string());
                return Err(err);
            }
            if step.command == Command::Snapshot {
                let text = table_to_text(&self.escalator);
                events.log_snapshot(step.line, &compute_text_checksum(&text));
                self.snapshots.push(text);
            }
        }
        Ok(())
    }

    /// Apply one command to the Escalator.
    pub fn apply(&mut self, command: &Command) -> Result<(), EscalatorError> {
        let escalator = &mut self.escalator;
        match *command {
            Command::Size { width, height } => escalator.set_size(width, height),
            Command::Columns { op, offset, count } => match op {
                RangeOp::Insert => escalator.insert_columns(offset, count),
                RangeOp::Remove => escalator.remove_columns(offset, count),
                RangeOp::Refresh => escalator.refresh_columns(offset, count),
            },
            Command::Rows {
                section,
                op,
                offset,
                count,
            } => match op {
                RangeOp::Insert => escalator.insert_rows(section, offset, count),
                RangeOp::Remove => escalator.remove_rows(section, offset, count),
                RangeOp::Refresh => escalator.refresh_rows(section, offset, count),
            },
            Command::Frozen(count) => escalator.set_frozen_column_count(count),
            Command::Width { column, width } => escalator.set_column_width(column, width),
            Command::RowHeight { section, px } => escalator.set_default_row_height(section, px),
            Command::HeightByRows(rows) => escalator.set_height_by_rows(rows),
            Command::ScrollTop(y) => {
                escalator.set_scroll_top(y);
                Ok(())
            }
            Command::ScrollLeft(x) => {
                escalator.set_scroll_left(x);
                Ok(())
            }
            Command::ScrollTo {
                target,
                index,
                destination,
                padding,
            } => match target {
                ScrollTarget::Row => escalator.scroll_to_row(index, destination, padding),
                ScrollTarget::Spacer => escalator.scroll_to_spacer(index, destination, padding),
                ScrollTarget::RowAndSpacer => {
                    escalator.scroll_to_row_and_spacer(index, destination, padding)
                }
                ScrollTarget::Column => escalator.scroll_to_column(index, destination, padding),
            },
            Command::Spacer { row, height } => escalator.set_spacer(row, height),
            Command::Snapshot => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_skips_comments() {
        let script = parse(
            "# demo\n\
             size 800 400\n\
             \n\
             rows tbody insert 0 100\n\
             width 2 auto\n\
             scroll-to-row 50 middle\n\
             scroll-to-column 3 end 10\n\
             snapshot\n",
        )
        .unwrap();
        let lines: Vec<usize> = script.steps.iter().map(|step| step.line).collect();
        assert_eq!(lines, vec![2, 4, 5, 6, 7, 8]);
        assert_eq!(
            script.steps[1].command,
            Command::Rows {
                section: Section::Body,
                op: RangeOp::Insert,
                offset: 0,
                count: 100
            }
        );
        assert_eq!(
            script.steps[2].command,
            Command::Width {
                column: 2,
                width: ColumnWidth::Auto
            }
        );
        assert_eq!(
            script.steps[4].command,
            Command::ScrollTo {
                target: ScrollTarget::Column,
                index: 3,
                destination: ScrollDestination::End,
                padding: 10.0
            }
        );
    }

    #[test]
    fn syntax_errors_carry_the_line() {
        let err = parse("size 10 10\nrows sidebar insert 0 1\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind_str(), "syntax");
        assert!(err.to_string().starts_with("line 2: unknown section"));
        assert!(err.source().is_none());

        assert!(parse_command("frozen").is_err());
        assert!(parse_command("columns insert -1 2").is_err());
        assert!(parse_command("scroll-to-row 1 sideways").is_err());
        assert!(parse_command("teleport 3").is_err());
    }

    #[test]
    fn rejected_commands_wrap_the_escalator_error() {
        let script = parse("columns insert 0 2\nrows body remove 0 1\n").unwrap();
        let mut replay = Replay::new(EscalatorConfig::default()).unwrap();
        let err = replay.run(&script, &mut EventLog::noop()).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind_str(), "out-of-bounds");
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<EscalatorError>().is_some());
        assert_eq!(replay.escalator().column_count(), 2);
    }

    #[test]
    fn snapshots_are_recorded_in_order() {
        let script = parse(
            "size 300 100\ncolumns insert 0 2\nrows body insert 0 2\nsnapshot\nscroll-left 50\nsnapshot\n",
        )
        .unwrap();
        let mut replay = Replay::new(EscalatorConfig::default()).unwrap();
        let mut events = EventLog::noop();
        replay.run(&script, &mut events).unwrap();
        assert_eq!(replay.snapshots().len(), 2);
        assert_eq!(events.checksums().len(), 2);
        assert!(replay.snapshots()[0].contains("  1 top 20 | 0@0 \"1:0\" | 1@100 \"1:1\""));
    }
}
