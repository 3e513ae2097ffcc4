//! # Fleet-Console Test Suite
//!
//! Cross-crate integration tests exercising the full ingestion pipeline
//! over the in-memory bus: publish → queue → drain → buffer → pagination.
//!
//! Unit tests live next to the code they cover; this crate holds only the
//! flows that span `console-bus` and `console-stream` together.

pub mod integration;

/// Installs a compact `tracing` subscriber for test runs.
///
/// Safe to call from every test; only the first call wins. Enable with
/// `RUST_LOG=debug cargo test` to see drain and subscription activity.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .compact()
        .try_init();
}
