//! Tracing/logging setup shared by the client library and the CLI.

/// Initialize process-wide JSON logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Initialize human-readable logging (interactive CLI use).
pub fn init_pretty() {
    tracing::init(LogFormat::Pretty);
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use self::tracing::LogFormat;
