use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Insufficient cash: required {required}, available {available}")]
    InsufficientCash { required: String, available: String },

    #[error("Portfolio invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Malformed feature frame: {0}")]
    MalformedFrame(String),
}
