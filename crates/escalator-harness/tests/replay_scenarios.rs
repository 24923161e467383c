//! Scenario scripts replayed end to end through the harness.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use escalator::{EscalatorConfig, Section};
use escalator_harness::{EventLog, Replay, ScriptErrorKind, parse};
use serde_json::Value;

const FROZEN_SCROLL: &str = include_str!("scenarios/frozen_scroll.esc");
const MUTATIONS: &str = include_str!("scenarios/mutations.esc");
const REJECTED: &str = include_str!("scenarios/rejected.esc");

// ============================================================================
// Helpers
// ============================================================================

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
    fn events(&self) -> Vec<Value> {
        let bytes = self.0.borrow().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn replay(source: &str) -> (Replay, Vec<Value>) {
    let script = parse(source).unwrap();
    let mut replay = Replay::new(EscalatorConfig::default()).unwrap();
    let sink = Sink::default();
    let mut events = EventLog::new(sink.clone());
    replay.run(&script, &mut events).unwrap();
    (replay, sink.events())
}

fn checksums(source: &str) -> Vec<String> {
    let script = parse(source).unwrap();
    let mut replay = Replay::new(EscalatorConfig::default()).unwrap();
    let mut events = EventLog::noop();
    replay.run(&script, &mut events).unwrap();
    events.checksums().to_vec()
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn frozen_column_stays_put_while_scrolled() {
    let (replay, _) = replay(FROZEN_SCROLL);
    let text = &replay.snapshots()[0];

    assert!(text.starts_with("table 800x400 scroll 200,0 columns 10 frozen 1"), "{text}");
    assert!(text.contains("  0 top 0 | *|0@0 \"0:0\""), "{text}");
    assert!(text.contains(" | 3@100 \"0:3\""), "{text}");
    assert!(text.contains("  ~ spacer 3 top 80 h 50 \"\""), "{text}");
    assert!(text.contains("  4 top 130 |"), "{text}");
}

#[test]
fn mutations_move_the_scroll_position() {
    let (replay, _) = replay(MUTATIONS);
    let snapshots = replay.snapshots();
    assert_eq!(snapshots.len(), 4);
    assert!(snapshots[0].contains("scroll 0,400 "), "{}", snapshots[0]);
    assert!(snapshots[1].contains("scroll 0,200 "), "{}", snapshots[1]);
    assert!(snapshots[1].contains("body rows 30 "), "{}", snapshots[1]);
    assert!(snapshots[2].contains("scroll 0,300 "), "{}", snapshots[2]);
    assert!(snapshots[2].contains("columns 5 "), "{}", snapshots[2]);
    assert!(snapshots[3].starts_with("table 400x90 "), "{}", snapshots[3]);

    let escalator = replay.escalator();
    assert_eq!(escalator.row_count(Section::Body), 35);
    assert!(escalator.column_width_actual(1).unwrap() > 0.0);
}

#[test]
fn checksums_are_deterministic() {
    let first = checksums(MUTATIONS);
    assert_eq!(first.len(), 4);
    assert_eq!(first, checksums(MUTATIONS));
    assert_ne!(first[0], first[1]);
}

// ============================================================================
// Event log
// ============================================================================

#[test]
fn lifecycle_events_follow_their_command() {
    let (_, events) = replay(FROZEN_SCROLL);

    let insert_line = events
        .iter()
        .find(|e| e["event"] == "command" && e["command"] == "rows body insert 0 100")
        .map(|e| e["line"].clone())
        .unwrap();
    let phases: Vec<&str> = events
        .iter()
        .filter(|e| e["event"] == "lifecycle" && e["line"] == insert_line && e["row"] == 0)
        .filter(|e| e["section"] == "body")
        .map(|e| e["phase"].as_str().unwrap())
        .collect();
    assert_eq!(phases, vec!["pre_attach", "post_attach", "update"]);

    let spacer: Vec<&Value> = events
        .iter()
        .filter(|e| e["event"] == "lifecycle" && e["phase"] == "spacer_init")
        .collect();
    assert_eq!(spacer.len(), 1);
    assert_eq!(spacer[0]["row"], 3);
    assert!(spacer[0]["element"].is_null());

    let snapshot = events.iter().find(|e| e["event"] == "snapshot").unwrap();
    assert_eq!(snapshot["index"], 0);
    assert!(snapshot["checksum"].as_str().unwrap().starts_with("h64:"));
}

#[test]
fn rejected_command_stops_the_replay() {
    let script = parse(REJECTED).unwrap();
    let mut replay = Replay::new(EscalatorConfig::default()).unwrap();
    let sink = Sink::default();
    let mut events = EventLog::new(sink.clone());

    let err = replay.run(&script, &mut events).unwrap_err();
    assert_eq!(err.line, 4);
    assert!(matches!(err.kind, ScriptErrorKind::Rejected(_)));
    assert_eq!(events.checksums().len(), 1);
    assert_eq!(replay.escalator().row_count(Section::Body), 5);

    let events = sink.events();
    let last = events.last().unwrap();
    assert_eq!(last["event"], "error");
    assert_eq!(last["kind"], "out-of-bounds");
    assert_eq!(last["line"], 4);
    assert!(
        !events
            .iter()
            .any(|e| e["event"] == "lifecycle" && e["line"] == 4),
        "rejected command fired callbacks"
    );
}
