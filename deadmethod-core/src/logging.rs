//! Structured logging using **tracing**.
//!
//! The library only emits events; installing a subscriber is left to the
//! binary. Per-call-site misses are `trace`, per-package progress is `debug`,
//! run summaries are `info`.

/// Initializes the global tracing subscriber.
///
/// Call *once* at startup. JSON lines go to stderr, keeping stdout for the
/// report itself.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=deadmethod_core=debug`)
pub fn init_structured_logging() {
    init_with_default_filter("warn");
}

/// Like [`init_structured_logging`], with the filter used when `RUST_LOG`
/// is unset.
pub fn init_with_default_filter(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
