//! Rate-limit aware wrapper around [`MarketApi`].
//!
//! Contract for every call:
//! - await the shared [`PauseGate`] before dispatching
//! - on a rate-limit response, close the gate for the cooldown, wait it out
//!   and retry exactly once
//! - any other failure, or a failed retry, resolves to `None` ("no data")
//!
//! Nothing here ever returns an error to the caller. Absence of data must be
//! read as "skip this signal", never as zero.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::MarketApi;
use crate::errors::MarketError;
use crate::pause_gate::PauseGate;
use crate::types::{Instrument, Kline, TimeRange};

/// Cooldown applied after a rate-limit response. Slightly longer than the
/// API's shortest documented window.
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(31);

/// Counters for operational visibility. They never affect behavior.
#[derive(Clone, Default, Debug)]
pub struct RateLimitStats {
    pub rate_limited: Arc<AtomicU64>,
    pub retries_failed: Arc<AtomicU64>,
    pub request_failures: Arc<AtomicU64>,
}

impl RateLimitStats {
    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    pub fn retries_failed(&self) -> u64 {
        self.retries_failed.load(Ordering::Relaxed)
    }

    pub fn request_failures(&self) -> u64 {
        self.request_failures.load(Ordering::Relaxed)
    }
}

pub struct RateLimitedClient<A> {
    api: Arc<A>,
    gate: PauseGate,
    cooldown: Duration,
    stats: RateLimitStats,
}

impl<A: MarketApi> RateLimitedClient<A> {
    pub fn new(api: Arc<A>, gate: PauseGate, cooldown: Duration) -> Self {
        Self {
            api,
            gate,
            cooldown,
            stats: RateLimitStats::default(),
        }
    }

    pub fn gate(&self) -> &PauseGate {
        &self.gate
    }

    pub fn stats(&self) -> &RateLimitStats {
        &self.stats
    }

    /// Runs `op` under the pause gate with the single-retry policy.
    ///
    /// `op` is invoked at most twice.
    pub async fn call<T, F, Fut>(&self, label: &str, op: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, MarketError>>,
    {
        self.gate.wait().await;

        match op().await {
            Ok(v) => Some(v),
            Err(e) if e.is_rate_limited() => {
                self.stats.rate_limited.fetch_add(1, Ordering::Relaxed);

                let pause = self.gate.pause_for(self.cooldown);
                if pause.opened {
                    warn!(
                        label,
                        cooldown_ms = self.cooldown.as_millis() as u64,
                        "rate limit hit; pausing all outbound calls"
                    );
                } else {
                    debug!(label, "rate limit hit; joining active pause");
                }

                self.gate.wait().await;

                match op().await {
                    Ok(v) => Some(v),
                    Err(e) => {
                        if e.is_rate_limited() {
                            self.stats.rate_limited.fetch_add(1, Ordering::Relaxed);
                        }
                        self.stats.retries_failed.fetch_add(1, Ordering::Relaxed);
                        warn!(label, error = %e, "retry after rate limit failed");
                        None
                    }
                }
            }
            Err(e) => {
                self.stats.request_failures.fetch_add(1, Ordering::Relaxed);
                warn!(label, error = %e, "request failed");
                None
            }
        }
    }

    pub async fn active_instruments(&self) -> Option<Vec<Instrument>> {
        self.call("active instruments", || self.api.active_instruments())
            .await
    }

    pub async fn daily_klines(&self, label: &str, symbol: &str, range: TimeRange) -> Option<Vec<Kline>> {
        self.call(label, || self.api.daily_klines(symbol, range)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tracing_test::traced_test;

    struct NullApi;

    #[async_trait]
    impl MarketApi for NullApi {
        async fn active_instruments(&self) -> Result<Vec<Instrument>, MarketError> {
            Err(MarketError::Status(503))
        }

        async fn daily_klines(&self, _symbol: &str, _range: TimeRange) -> Result<Vec<Kline>, MarketError> {
            Err(MarketError::RateLimited)
        }
    }

    fn client() -> RateLimitedClient<NullApi> {
        RateLimitedClient::new(Arc::new(NullApi), PauseGate::new(), DEFAULT_RATE_LIMIT_COOLDOWN)
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn failed_request_is_logged_with_label() {
        let out = client().active_instruments().await;

        assert!(out.is_none());
        assert!(logs_contain("request failed"));
        assert!(logs_contain("active instruments"));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn rate_limit_logs_pause_then_failed_retry() {
        let c = client();
        let range = TimeRange {
            from: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            to: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH + chrono::TimeDelta::days(1),
        };

        let out = c.daily_klines("historical window", "XBTUSDTM", range).await;

        assert!(out.is_none());
        assert!(logs_contain("pausing all outbound calls"));
        assert!(logs_contain("retry after rate limit failed"));
        assert_eq!(c.stats().rate_limited(), 2);
        assert_eq!(c.stats().retries_failed(), 1);
    }
}
