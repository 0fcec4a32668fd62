use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Policy parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("Observation vector has {got} entries, expected {expected}")]
    ObservationLength { expected: usize, got: usize },
}
