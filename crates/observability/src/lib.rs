//! Tracing/logging setup shared by binaries and integration tests.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError, init_with};
