#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports the tracing macros when the `tracing` feature is enabled and
//! provides no-op stand-ins otherwise, so call sites never need a `cfg`.
//!
//! ```ignore
//! let span = escalator_core::debug_span!("escalator.insert_rows", offset, count);
//! let _guard = span.enter();
//! escalator_core::trace!(attached = 3, detached = 0, "converged");
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

// Without the feature every macro expands to nothing (events) or to a
// `NoopSpan` (spans); arguments are never evaluated.
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    #[macro_export]
    macro_rules! trace { ($($arg:tt)*) => {}; }
    #[macro_export]
    macro_rules! debug { ($($arg:tt)*) => {}; }
    #[macro_export]
    macro_rules! info { ($($arg:tt)*) => {}; }
    #[macro_export]
    macro_rules! warn { ($($arg:tt)*) => {}; }
    #[macro_export]
    macro_rules! error { ($($arg:tt)*) => {}; }

    #[macro_export]
    macro_rules! trace_span { ($($arg:tt)*) => { $crate::logging::NoopSpan }; }
    #[macro_export]
    macro_rules! debug_span { ($($arg:tt)*) => { $crate::logging::NoopSpan }; }
    #[macro_export]
    macro_rules! info_span { ($($arg:tt)*) => { $crate::logging::NoopSpan }; }
    #[macro_export]
    macro_rules! warn_span { ($($arg:tt)*) => { $crate::logging::NoopSpan }; }
    #[macro_export]
    macro_rules! error_span { ($($arg:tt)*) => { $crate::logging::NoopSpan }; }
}

/// Stand-in for `tracing::Span`.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

/// Environment variable holding the `EnvFilter` directive for JSON logging.
#[cfg(feature = "tracing-json")]
pub const ENV_LOG_FILTER: &str = "ESCALATOR_LOG";

/// Install a global JSON subscriber filtered by `ESCALATOR_LOG`.
///
/// Falls back to `warn` when the variable is unset or unparsable. Returns
/// `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn noop_macros_accept_fields() {
        let rows = 3usize;
        let span = crate::debug_span!("escalator.test", rows);
        let _guard = span.enter();
        crate::trace!(rows, "converged");
        crate::warn!("never printed {}", rows);
        assert_eq!(rows, 3);
    }
}
