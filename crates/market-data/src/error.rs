use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Indicator configuration is invalid: {0}")]
    InvalidIndicatorParams(String),

    #[error("Candle history for {0} is missing")]
    MissingProduct(String),

    #[error("Feature frame construction failed: {0}")]
    Frame(#[from] core_types::CoreError),

    #[error("Feed error: {0}")]
    Feed(String),
}
