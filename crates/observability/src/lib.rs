//! Tracing and logging (shared setup for the API server and the schema CLI).

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

pub use tracing::LogFormat;

/// Tracing configuration (filters, formatters).
pub mod tracing;
