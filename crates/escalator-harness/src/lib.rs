#![forbid(unsafe_code)]

//! Scenario replay and golden checks for the Escalator table core.
//!
//! - [`script`]: a line-based command language and a [`Replay`] that runs it
//!   against an [`escalator::Escalator`] with recording updaters.
//! - [`present`]: a deterministic plain-text view of the materialized rows
//!   and cells.
//! - [`golden`]: text checksums, golden checksum files and the JSONL event
//!   log.
//!
//! # Quick Start
//!
//! ```
//! use escalator::EscalatorConfig;
//! use escalator_harness::{EventLog, Replay, parse};
//!
//! let script = parse("columns insert 0 3\nrows body insert 0 50\nsnapshot\n").unwrap();
//! let mut replay = Replay::new(EscalatorConfig::default()).unwrap();
//! let mut events = EventLog::noop();
//! replay.run(&script, &mut events).unwrap();
//! assert_eq!(events.checksums().len(), 1);
//! ```
//!
//! Golden checksum files live under `tests/golden/`; run with `BLESS=1` to
//! rewrite them.

pub mod golden;
pub mod present;
pub mod script;

pub use golden::{
    CHECKSUM_PREFIX, EventLog, GoldenOutcome, compute_text_checksum, golden_checksum_path,
    is_bless_mode, lifecycle_event_json, load_golden_checksums, save_golden_checksums,
    verify_checksums,
};
pub use present::table_to_text;
pub use script::{Command, Replay, Script, ScriptError, ScriptErrorKind, Step, parse};
