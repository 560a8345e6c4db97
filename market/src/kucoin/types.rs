use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketError;
use crate::types::{Instrument, Kline};

pub const CODE_OK: &str = "200000";
pub const CODE_RATE_LIMITED: &str = "429000";

/// Kline bar granularity in minutes (one calendar day).
pub const DAILY_GRANULARITY: u32 = 1440;

/// Position of the traded volume inside a kline row.
pub const KLINE_VOLUME_INDEX: usize = 5;

/// Display labels are the base currency with this prefix.
pub const BASE_LABEL_PREFIX: &str = "K";

/// Every KuCoin response is wrapped in `{ "code": ..., "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T, MarketError> {
        match self.code.as_str() {
            CODE_OK => self
                .data
                .ok_or_else(|| MarketError::InvalidResponse("missing data".into())),
            CODE_RATE_LIMITED => Err(MarketError::RateLimited),
            _ => Err(MarketError::Api {
                code: self.code,
                msg: self.msg.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub symbol: String,
    pub base_currency: String,
}

impl From<Contract> for Instrument {
    fn from(c: Contract) -> Self {
        Instrument::new(c.symbol, format!("{BASE_LABEL_PREFIX}{}", c.base_currency))
    }
}

/// Raw kline row: `[time, open, high, low, close, volume, ...]`.
pub type KlineRow = Vec<Value>;

/// Parses one row. Rows without a usable timestamp are skipped; a volume
/// that is not numeric is kept as `None` so callers can count it as invalid.
pub fn parse_kline_row(row: &[Value]) -> Option<Kline> {
    let ts_ms = row.first().and_then(as_number).map(|ts| ts as i64)?;
    let volume = row.get(KLINE_VOLUME_INDEX).and_then(as_number);
    Some(Kline { ts_ms, volume })
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
