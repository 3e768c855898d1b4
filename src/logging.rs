//! Tracing subscriber setup for embedding binaries and tests.

/// Installs the global subscriber. Safe to call more than once; later
/// calls are no-ops, so test binaries can call it per test.
///
/// `TRIPLOG_LOG` overrides the filter; sqlx chatter is capped at warn by
/// default.
pub fn init() {
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("TRIPLOG_LOG").unwrap_or_else(|_| "triplog=info,sqlx=warn".into()),
        )
        .with_target(true)
        .try_init();
}
