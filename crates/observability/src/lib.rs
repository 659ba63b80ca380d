//! Process-wide log setup shared by Velithra binaries.

/// Initialize tracing output for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, JSON layer).
pub mod tracing;
