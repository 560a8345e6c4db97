use std::future::Future;
use std::time::Duration;

use tracing::{Span, field};

use super::TraceId;

/// Root span for one detection run.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "run",
        name = %name,
        trace_id = %trace_id,
        instruments = field::Empty
    )
}

/// Child span for the evaluation of a single instrument.
pub fn child_span(name: &'static str, symbol: &str) -> Span {
    tracing::info_span!("instrument", name = %name, symbol = %symbol)
}

/// Awaits `fut` and emits a warning when it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
