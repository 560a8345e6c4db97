use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::api::MarketApi;
use crate::rate_limited::RateLimitedClient;
use crate::types::{Instrument, Kline, TimeRange};

/// Volume of the most recently completed UTC day.
pub struct CurrentWindowFetcher<A> {
    client: Arc<RateLimitedClient<A>>,
}

impl<A: MarketApi> CurrentWindowFetcher<A> {
    pub fn new(client: Arc<RateLimitedClient<A>>) -> Self {
        Self { client }
    }

    /// Sum of every valid volume in the window, or `None` if the request
    /// produced no data at all. Bars stamped outside the window (today's
    /// partial bar, for one) are ignored.
    pub async fn fetch(&self, instrument: &Instrument, day_start: DateTime<Utc>) -> Option<f64> {
        let symbol = instrument.full_symbol.as_str();
        let label = format!("rolling 24h volume for {symbol}");

        let range = previous_day(day_start);
        let klines: Vec<Kline> = self
            .client
            .daily_klines(&label, symbol, range)
            .await?
            .into_iter()
            .filter(|k| range.contains_ms(k.ts_ms))
            .collect();

        let volume = sum_valid_volume(&klines);
        debug!(symbol, volume, bars = klines.len(), "current volume fetched");

        Some(volume)
    }
}

/// `[yesterday 00:00, today 00:00)` in UTC.
pub fn previous_day(day_start: DateTime<Utc>) -> TimeRange {
    TimeRange {
        from: day_start - TimeDelta::days(1),
        to: day_start,
    }
}

pub fn sum_valid_volume(klines: &[Kline]) -> f64 {
    klines.iter().filter_map(Kline::valid_volume).sum()
}
