use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{Contract, DAILY_GRANULARITY, Envelope, KlineRow, parse_kline_row};
use crate::api::MarketApi;
use crate::errors::MarketError;
use crate::types::{Instrument, Kline, TimeRange};

#[derive(Clone)]
pub struct KucoinClient {
    http: Client,
    url: String,
}

impl KucoinClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, MarketError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketError> {
        let url = format!("{}{}", self.url, path);

        let resp = self.http.get(&url).query(query).send().await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketError::RateLimited);
        }
        if !status.is_success() {
            return Err(MarketError::Status(status.as_u16()));
        }

        let envelope: Envelope<T> = resp.json().await?;
        envelope.into_data()
    }
}

#[async_trait]
impl MarketApi for KucoinClient {
    #[instrument(skip(self), level = "debug")]
    async fn active_instruments(&self) -> Result<Vec<Instrument>, MarketError> {
        let contracts: Vec<Contract> = self.get("/contracts/active", &[]).await?;

        debug!(count = contracts.len(), "active contracts fetched");

        Ok(contracts.into_iter().map(Instrument::from).collect())
    }

    #[instrument(
        skip(self, range),
        fields(from = range.from_ms(), to = range.to_ms()),
        level = "debug"
    )]
    async fn daily_klines(&self, symbol: &str, range: TimeRange) -> Result<Vec<Kline>, MarketError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("granularity", DAILY_GRANULARITY.to_string()),
            ("from", range.from_ms().to_string()),
            ("to", range.to_ms().to_string()),
        ];

        let rows: Vec<KlineRow> = self.get("/kline/query", &query).await?;
        let klines: Vec<Kline> = rows.iter().filter_map(|r| parse_kline_row(r)).collect();

        debug!(rows = rows.len(), parsed = klines.len(), "klines fetched");

        Ok(klines)
    }
}
