use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Risk parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("Allocation vector has {got} entries, expected {expected}")]
    AllocationLength { expected: usize, got: usize },
}
