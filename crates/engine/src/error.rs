use thiserror::Error;

/// Errors surfaced by a live trading cycle.
///
/// Every variant except `Config` is treated as recoverable by the
/// supervising loop: it is logged and the loop retries after the short
/// backoff interval instead of terminating.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine configuration error: {0}")]
    Config(String),

    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] api_client::ApiError),

    #[error("Market data error: {0}")]
    MarketData(#[from] market_data::MarketDataError),

    #[error("Policy error: {0}")]
    Policy(#[from] policy::PolicyError),

    #[error("Risk error: {0}")]
    Risk(#[from] risk::RiskError),
}

impl EngineError {
    /// Whether the supervising loop may retry after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Config(_))
    }
}
