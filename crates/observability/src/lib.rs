//! Tracing and logging setup shared by binaries and tests.

/// Initialize process-wide tracing (JSON logs, `RUST_LOG` filter).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize tracing for tests: human-readable output captured per test.
pub fn init_for_tests() {
    tracing::init_for_tests();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
