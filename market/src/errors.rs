use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    /// The API asked us to slow down (HTTP 429 or body code `429000`).
    #[error("rate limited by market api")]
    RateLimited,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(u16),

    #[error("market api error {code}: {msg}")]
    Api { code: String, msg: String },

    #[error("invalid response from market api: {0}")]
    InvalidResponse(String),
}

impl MarketError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
