use async_trait::async_trait;

use crate::errors::MarketError;
use crate::types::{Instrument, Kline, TimeRange};

/// Read-only view of the futures market-data API.
///
/// Implementations issue exactly one request per call; pacing, pausing and
/// retries belong to [`crate::RateLimitedClient`].
#[async_trait]
pub trait MarketApi: Send + Sync + 'static {
    /// Every instrument currently open for trading.
    async fn active_instruments(&self) -> Result<Vec<Instrument>, MarketError>;

    /// Daily bars for `symbol` whose timestamps fall inside `range`.
    async fn daily_klines(&self, symbol: &str, range: TimeRange) -> Result<Vec<Kline>, MarketError>;
}
