pub mod api;
pub mod current;
pub mod errors;
pub mod history;
pub mod kucoin;
pub mod pause_gate;
pub mod pulse;
pub mod rate_limited;
pub mod types;

pub use api::MarketApi;
pub use current::CurrentWindowFetcher;
pub use errors::MarketError;
pub use history::{HistoryFetcher, LookbackConfig};
pub use pause_gate::PauseGate;
pub use rate_limited::RateLimitedClient;
