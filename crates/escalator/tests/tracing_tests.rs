#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Spans and events enabled:
//!   cargo test -p escalator --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p escalator --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use escalator::{Escalator, Section};
#[cfg(feature = "tracing")]
use escalator::{ColumnConfiguration, Logged, RowContainer};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture
// ============================================================================

/// One span opening or one event, with its recorded fields.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
struct Record {
    /// Span name, or the `message` field of an event.
    name: String,
    fields: HashMap<String, String>,
    /// Innermost enclosing span.
    within: Option<String>,
}

#[derive(Default)]
struct Recorded {
    spans: Vec<Record>,
    events: Vec<Record>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Recorded>>);

impl Recorder {
    fn spans(&self) -> Vec<Record> {
        self.0.lock().unwrap().spans.clone()
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    fn events(&self) -> Vec<Record> {
        self.0.lock().unwrap().events.clone()
    }
}

#[derive(Default)]
struct Fields(HashMap<String, String>);

impl tracing::field::Visit for Fields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl<S> tracing_subscriber::Layer<S> for Recorder
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        let within = ctx.lookup_current().map(|span| span.name().to_string());
        self.0.lock().unwrap().spans.push(Record {
            name: attrs.metadata().name().to_string(),
            fields: fields.0,
            within,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let within = ctx.event_span(event).map(|span| span.name().to_string());
        let name = fields.0.get("message").cloned().unwrap_or_default();
        self.0.lock().unwrap().events.push(Record {
            name,
            fields: fields.0,
            within,
        });
    }
}

/// Run `f` with a capturing subscriber installed for the current thread.
fn capture(f: impl FnOnce()) -> Recorder {
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    tracing::subscriber::with_default(subscriber, f);
    recorder
}

fn populated() -> Escalator {
    let mut escalator = Escalator::default();
    escalator.insert_columns(0, 5).unwrap();
    escalator.insert_rows(Section::Body, 0, 100).unwrap();
    escalator
}

// ============================================================================
// Spans
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn spans_created_for_mutations() {
    let recorder = capture(|| {
        let mut escalator = populated();
        escalator.remove_rows(Section::Body, 10, 5).unwrap();
        escalator.set_spacer(3, 40.0).unwrap();
        escalator.set_frozen_column_count(1).unwrap();
        escalator.refresh_rows(Section::Body, 0, 3).unwrap();
        escalator.set_size(600.0, 300.0).unwrap();
        escalator.set_scroll_top(100.0);
        escalator.set_scroll_left(50.0);
    });

    let spans = recorder.spans();
    let names: Vec<&str> = spans.iter().map(|span| span.name.as_str()).collect();
    for expected in [
        "escalator.insert_columns",
        "escalator.insert_rows",
        "escalator.remove_rows",
        "escalator.refresh_rows",
        "escalator.set_spacer",
        "escalator.set_frozen_column_count",
        "escalator.set_size",
        "escalator.set_scroll_top",
        "escalator.set_scroll_left",
    ] {
        assert!(names.contains(&expected), "missing {expected}: {names:?}");
    }

    let insert = spans
        .iter()
        .find(|span| span.name == "escalator.insert_rows")
        .unwrap();
    assert_eq!(insert.fields.get("section").map(String::as_str), Some("body"));
    assert_eq!(insert.fields.get("count").map(String::as_str), Some("100"));
    assert_eq!(insert.within, None);
}

#[test]
#[cfg(feature = "tracing")]
fn convergence_event_reports_counts() {
    let recorder = capture(|| {
        let _ = populated();
    });

    let converged: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|event| event.name == "converged")
        .collect();
    let from_insert = converged
        .iter()
        .find(|event| event.within.as_deref() == Some("escalator.insert_rows"))
        .expect("insert_rows converged event");
    assert_eq!(from_insert.fields.get("attached").map(String::as_str), Some("22"));
    assert_eq!(from_insert.fields.get("detached").map(String::as_str), Some("0"));
}

#[test]
#[cfg(feature = "tracing")]
fn logged_wrapper_emits_outcomes() {
    let recorder = capture(|| {
        let mut escalator = Escalator::default();
        let mut columns = Logged::new(escalator.columns());
        columns.insert_columns(0, 2).unwrap();
        let _ = columns.remove_columns(5, 1);
        drop(columns);
        let mut body = Logged::new(escalator.body());
        body.insert_rows(0, 3).unwrap();
    });

    let events = recorder.events();
    let outcome = |name: &str| {
        events
            .iter()
            .find(|event| event.name == name)
            .and_then(|event| event.fields.get("outcome").cloned())
    };
    assert_eq!(outcome("insert_columns").as_deref(), Some("ok"));
    assert_eq!(outcome("remove_columns").as_deref(), Some("out-of-bounds"));
    assert_eq!(outcome("insert_rows").as_deref(), Some("ok"));
}

// ============================================================================
// Zero overhead
// ============================================================================

/// Without the `tracing` feature the instrumentation is compiled out.
#[test]
fn zero_overhead_when_disabled() {
    let recorder = capture(|| {
        let mut escalator = populated();
        escalator.set_scroll_top(500.0);
    });

    let escalator_spans = recorder
        .spans()
        .into_iter()
        .filter(|span| span.name.starts_with("escalator."))
        .count();

    #[cfg(not(feature = "tracing"))]
    assert_eq!(escalator_spans, 0, "spans emitted without the tracing feature");
    #[cfg(feature = "tracing")]
    assert!(escalator_spans > 0);
}
