//! Checksums of text snapshots, golden checksum files and the JSONL event log.
//!
//! # JSONL schema
//!
//! ```json
//! {"event":"command","line":3,"command":"rows body insert 0 100"}
//! {"event":"lifecycle","line":3,"phase":"pre_attach","section":"body","row":0,"element":"body#0","attached":false,"columns":[0,1]}
//! {"event":"snapshot","line":7,"index":0,"checksum":"h64:..."}
//! {"event":"error","line":9,"kind":"out-of-bounds","message":"..."}
//! {"event":"complete","commands":9,"snapshots":1,"outcome":"pass"}
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

use escalator::LifecycleEvent;
use serde_json::{Value, json};

/// Prefix of every checksum string.
pub const CHECKSUM_PREFIX: &str = "h64:";

/// Deterministic 64-bit hash of a text snapshot.
#[must_use]
pub fn compute_text_checksum(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let hash = hasher.finish();
    format!("{CHECKSUM_PREFIX}{hash:016x}")
}

/// JSON object for one recorded hook call.
#[must_use]
pub fn lifecycle_event_json(line: usize, event: &LifecycleEvent) -> Value {
    json!({
        "event": "lifecycle",
        "line": line,
        "phase": event.phase.as_str(),
        "section": event.section.as_str(),
        "row": event.row,
        "element": event.element.map(|id| id.to_string()),
        "attached": event.attached,
        "columns": event.columns,
    })
}

// ============================================================================
// Event log
// ============================================================================

/// Outcome of a replay checked against golden checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldenOutcome {
    Pass,
    Fail,
    /// Replay aborted on a script error.
    Error,
}

impl GoldenOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

/// Writes one JSON object per line. Write failures are ignored so that a
/// closed pipe never aborts a replay.
pub struct EventLog {
    writer: Option<Box<dyn Write>>,
    checksums: Vec<String>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("enabled", &self.writer.is_some())
            .field("checksums", &self.checksums)
            .finish()
    }
}

impl EventLog {
    pub fn new(writer: impl Write + 'static) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            checksums: Vec::new(),
        }
    }

    /// A log that only collects checksums.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            writer: None,
            checksums: Vec::new(),
        }
    }

    pub fn log_command(&mut self, line: usize, command: &str) {
        self.write(&json!({"event": "command", "line": line, "command": command}));
    }

    pub fn log_lifecycle(&mut self, line: usize, event: &LifecycleEvent) {
        self.write(&lifecycle_event_json(line, event));
    }

    pub fn log_snapshot(&mut self, line: usize, checksum: &str) {
        let index = self.checksums.len();
        self.checksums.push(checksum.to_string());
        self.write(&json!({
            "event": "snapshot",
            "line": line,
            "index": index,
            "checksum": checksum,
        }));
    }

    pub fn log_error(&mut self, line: usize, kind: &str, message: &str) {
        self.write(&json!({
            "event": "error",
            "line": line,
            "kind": kind,
            "message": message,
        }));
    }

    pub fn log_complete(&mut self, commands: usize, outcome: GoldenOutcome) {
        self.write(&json!({
            "event": "complete",
            "commands": commands,
            "snapshots": self.checksums.len(),
            "outcome": outcome.as_str(),
        }));
    }

    /// Checksums logged so far, in order.
    #[must_use]
    pub fn checksums(&self) -> &[String] {
        &self.checksums
    }

    fn write(&mut self, value: &Value) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

// ============================================================================
// Golden files
// ============================================================================

/// `<base_dir>/tests/golden/<name>.checksums`
#[must_use]
pub fn golden_checksum_path(base_dir: &Path, name: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("golden")
        .join(format!("{name}.checksums"))
}

/// Expected checksums, one per line; `#` lines are comments. A missing file
/// yields no checksums.
pub fn load_golden_checksums(path: &Path) -> std::io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

pub fn save_golden_checksums(path: &Path, checksums: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = String::from("# Golden checksums - regenerate with BLESS=1\n");
    for checksum in checksums {
        content.push_str(checksum);
        content.push('\n');
    }
    fs::write(path, content)
}

/// `BLESS=1` (or `true`) rewrites golden files instead of checking them.
#[must_use]
pub fn is_bless_mode() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Compare checksums; on failure returns the first mismatching index, or
/// `None` when only the counts differ.
#[must_use]
pub fn verify_checksums(actual: &[String], expected: &[String]) -> (GoldenOutcome, Option<usize>) {
    if expected.is_empty() {
        return (GoldenOutcome::Pass, None);
    }
    if let Some(at) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        return (GoldenOutcome::Fail, Some(at));
    }
    if actual.len() != expected.len() {
        return (GoldenOutcome::Fail, None);
    }
    (GoldenOutcome::Pass, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use escalator::{ElementId, LifecyclePhase, Section};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared in-memory sink.
    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn lines(&self) -> Vec<Value> {
            String::from_utf8(self.0.borrow().clone())
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    #[test]
    fn checksum_is_stable_and_prefixed() {
        let a = compute_text_checksum("body rows 3");
        assert!(a.starts_with(CHECKSUM_PREFIX));
        assert_eq!(a.len(), CHECKSUM_PREFIX.len() + 16);
        assert_eq!(a, compute_text_checksum("body rows 3"));
        assert_ne!(a, compute_text_checksum("body rows 4"));
    }

    #[test]
    fn lifecycle_json_fields() {
        let event = LifecycleEvent {
            phase: LifecyclePhase::PreAttach,
            section: Section::Body,
            row: 7,
            element: Some(ElementId::new(Section::Body, 2)),
            attached: false,
            columns: vec![0, 1],
        };
        let value = lifecycle_event_json(4, &event);
        assert_eq!(value["event"], "lifecycle");
        assert_eq!(value["line"], 4);
        assert_eq!(value["phase"], "pre_attach");
        assert_eq!(value["element"], "body#2");
        assert_eq!(value["columns"], json!([0, 1]));
    }

    #[test]
    fn spacer_events_have_null_element() {
        let event = LifecycleEvent {
            phase: LifecyclePhase::SpacerInit,
            section: Section::Body,
            row: 3,
            element: None,
            attached: true,
            columns: Vec::new(),
        };
        assert!(lifecycle_event_json(1, &event)["element"].is_null());
    }

    #[test]
    fn event_log_writes_one_object_per_line() {
        let sink = Sink::default();
        let mut log = EventLog::new(sink.clone());
        log.log_command(1, "size 10 10");
        log.log_snapshot(2, "h64:0000000000000001");
        log.log_snapshot(3, "h64:0000000000000002");
        log.log_complete(3, GoldenOutcome::Pass);

        let lines = sink.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["command"], "size 10 10");
        assert_eq!(lines[2]["index"], 1);
        assert_eq!(lines[3]["snapshots"], 2);
        assert_eq!(lines[3]["outcome"], "pass");
        assert_eq!(log.checksums().len(), 2);
    }

    #[test]
    fn noop_log_still_collects_checksums() {
        let mut log = EventLog::noop();
        log.log_snapshot(1, "h64:00");
        assert_eq!(log.checksums(), ["h64:00".to_string()]);
    }

    #[test]
    fn verify_reports_first_mismatch() {
        let a = vec!["x".to_string(), "y".to_string()];
        let b = vec!["x".to_string(), "z".to_string()];
        assert_eq!(verify_checksums(&a, &a), (GoldenOutcome::Pass, None));
        assert_eq!(verify_checksums(&a, &b), (GoldenOutcome::Fail, Some(1)));
        assert_eq!(verify_checksums(&a[..1], &a), (GoldenOutcome::Fail, None));
        assert_eq!(verify_checksums(&a, &[]), (GoldenOutcome::Pass, None));
    }

    #[test]
    fn golden_file_round_trip_skips_comments() {
        let dir = std::env::temp_dir().join(format!("escalator-golden-{}", std::process::id()));
        let path = golden_checksum_path(&dir, "case");
        let checksums = vec!["h64:aa".to_string(), "h64:bb".to_string()];
        save_golden_checksums(&path, &checksums).unwrap();
        assert_eq!(load_golden_checksums(&path).unwrap(), checksums);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_golden_file_is_empty() {
        let path = Path::new("/nonexistent/escalator/none.checksums");
        assert!(load_golden_checksums(path).unwrap().is_empty());
    }
}
