//! Historical daily volume.
//!
//! The lookback is split into fixed-size windows that are requested
//! concurrently. Window 0 is the most recent one; it stops short of the last
//! `skip_recent_days` calendar days (today included) so partially traded
//! days never reach the detector.
//!
//! Bars outside the requested half-open range are dropped here, whatever the
//! API does with the `to` bound.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::join_all;
use tracing::debug;

use crate::api::MarketApi;
use crate::rate_limited::RateLimitedClient;
use crate::types::{Instrument, TimeRange, VolumeHistory};

/// Upper bound on how far back a lookback may reach, in days.
pub const MAX_REACH_DAYS: u32 = 3_650;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookbackConfig {
    /// Number of range requests per instrument.
    pub windows: u32,
    /// Days covered by each request.
    pub window_days: u32,
    /// Most recent calendar days left out of the lookback, counting today.
    pub skip_recent_days: u32,
}

impl Default for LookbackConfig {
    fn default() -> Self {
        Self {
            windows: 8,
            window_days: 100,
            skip_recent_days: 2,
        }
    }
}

impl LookbackConfig {
    /// Request windows, newest first, relative to `day_start`.
    ///
    /// With `gap = skip_recent_days - 1` (days before `day_start` to skip),
    /// window `i` is `[day_start - (gap + (i+1)*size), day_start - (gap + i*size))`
    /// in days. Windows are adjacent and never overlap.
    ///
    /// Windows whose bounds fall outside the representable date range are
    /// left out, along with every older window.
    pub fn windows_from(&self, day_start: DateTime<Utc>) -> Vec<TimeRange> {
        let gap = i64::from(self.skip_recent_days.saturating_sub(1));
        let size = i64::from(self.window_days);

        let days_back = |n: i64| {
            let days = size.checked_mul(n)?.checked_add(gap)?;
            day_start.checked_sub_signed(TimeDelta::try_days(days)?)
        };

        (0..i64::from(self.windows))
            .map_while(|i| {
                Some(TimeRange {
                    from: days_back(i + 1)?,
                    to: days_back(i)?,
                })
            })
            .collect()
    }

    /// How far back before `day_start` the oldest window reaches, in days.
    /// `None` on overflow.
    pub fn reach_days(&self) -> Option<u32> {
        self.windows
            .checked_mul(self.window_days)?
            .checked_add(self.skip_recent_days.saturating_sub(1))
    }

    /// Whether the lookback stays within [`MAX_REACH_DAYS`].
    pub fn is_bounded(&self) -> bool {
        self.reach_days().is_some_and(|d| d <= MAX_REACH_DAYS)
    }
}

pub struct HistoryFetcher<A> {
    client: Arc<RateLimitedClient<A>>,
    lookback: LookbackConfig,
}

impl<A: MarketApi> HistoryFetcher<A> {
    pub fn new(client: Arc<RateLimitedClient<A>>, lookback: LookbackConfig) -> Self {
        Self { client, lookback }
    }

    /// Fetches every window concurrently and concatenates the valid samples.
    ///
    /// Windows that fail contribute nothing. Returns `None` only when no
    /// window produced a single valid sample.
    pub async fn fetch(&self, instrument: &Instrument, day_start: DateTime<Utc>) -> Option<VolumeHistory> {
        let symbol = instrument.full_symbol.as_str();
        let windows = self.lookback.windows_from(day_start);

        let calls = windows.into_iter().enumerate().map(|(i, range)| {
            let label = format!("historical volumes [{}] for {}", i + 1, symbol);
            async move {
                self.client
                    .daily_klines(&label, symbol, range)
                    .await
                    .map(|klines| {
                        klines
                            .into_iter()
                            .filter(|k| range.contains_ms(k.ts_ms))
                            .collect::<Vec<_>>()
                    })
            }
        });

        let chunks = join_all(calls).await;
        let failed_windows = chunks.iter().filter(|c| c.is_none()).count();

        let history = VolumeHistory::from_samples(
            chunks
                .into_iter()
                .flatten()
                .flatten()
                .filter_map(|k| k.to_sample()),
        );

        if history.is_empty() {
            debug!(symbol, failed_windows, "no historical volume available");
            return None;
        }

        debug!(
            symbol,
            samples = history.len(),
            failed_windows,
            "using daily volumes"
        );

        Some(history)
    }
}
