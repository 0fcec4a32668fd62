//! The offline simulation environment.
//!
//! `SimulationEnv` is the step-indexed state machine that backs both
//! policy episodes over historical data and the mathematical reference
//! for what the live path should do: identical risk constraints,
//! identical fee-consistent value transfer, identical observation layout.

pub mod env;
pub mod error;
pub mod report;

pub use env::{SimulationEnv, StepOutcome};
pub use error::SimulationError;
pub use report::{run_episode, EpisodeReport};
