use std::time::Duration;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset: the tracker's own targets at `info`,
/// slow-store warnings always on, chatty dependencies held back.
pub const DEFAULT_LOG_FILTER: &str =
    "info,engine=info,fetcher=info,cleaner=info,alert=warn,performance=warn,sqlx=warn,hyper=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. `json` selects machine-readable output for production.
pub fn init_tracing(json: bool) {
    let layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        // Ingestion ticks and HTTP requests report their duration on close.
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(env_filter());
    if json {
        registry.with(layer.json().flatten_event(true)).init();
    } else {
        registry.with(layer.compact()).init();
    }
}

/// Awaits `fut` and logs under the `performance` target when it runs past `budget`.
pub async fn warn_if_slow<F, T>(op: &'static str, budget: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let started = std::time::Instant::now();
    let out = fut.await;

    let elapsed = started.elapsed();
    if elapsed > budget {
        tracing::warn!(
            target: "performance",
            op,
            elapsed_ms = elapsed.as_millis() as u64,
            budget_ms = budget.as_millis() as u64,
            "store call exceeded its budget"
        );
    }
    out
}
