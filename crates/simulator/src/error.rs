use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Cannot simulate over an empty feature frame")]
    EmptyFrame,

    #[error("Risk constraint error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Portfolio state error: {0}")]
    Portfolio(#[from] core_types::CoreError),

    #[error("Policy error: {0}")]
    Policy(#[from] policy::PolicyError),
}
