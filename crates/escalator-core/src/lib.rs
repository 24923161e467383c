#![forbid(unsafe_code)]

//! Core: error taxonomy, configuration, logical index ranges and logging.

pub mod config;
pub mod error;
pub mod logging;
pub mod range;
pub mod section;

pub use config::{EscalatorConfig, HeightMode};
pub use error::{ErrorKind, EscalatorError, Result, Section};
pub use range::IndexRange;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
