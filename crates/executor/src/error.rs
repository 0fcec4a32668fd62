use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Execution parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("The provided price ({0}) is zero or negative.")]
    InvalidPrice(Decimal),
}
