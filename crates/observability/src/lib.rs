//! Tracing/logging setup shared by every binary and test harness.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing from `config`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &ObservabilityConfig) {
    crate::tracing::init(config);
}

/// Initialize from `RUST_LOG` / `RESUMEFORGE_LOG_FORMAT`.
pub fn init_from_env() {
    init(&ObservabilityConfig::from_env());
}
