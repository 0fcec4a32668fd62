use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Balance query failed: {0}")]
    Balance(String),

    #[error("Order rejected by venue: {0}")]
    Rejected(String),

    #[error("No mark price available for {0}")]
    MissingPrice(String),
}
