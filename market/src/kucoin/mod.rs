//! KuCoin Futures REST adapter.

pub mod client;
pub mod types;

pub use client::KucoinClient;

pub const DEFAULT_BASE_URL: &str = "https://api-futures.kucoin.com/api/v1";
