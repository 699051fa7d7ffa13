//! Tracing and logging setup shared by the smartstore binaries.

/// Initialize process-wide tracing, picking the output format from
/// `SMARTSTORE_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;
