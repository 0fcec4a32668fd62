//! The live orchestrator.
//!
//! `TradingSupervisor` runs the cycle loop: sentiment gate, balance
//! reconciliation, feature fetch, policy inference, risk constraint, and
//! per-asset order planning and placement. It owns no market state of
//! its own; every cycle rebuilds its view of the world from the venue
//! and the data feed.

pub mod error;
pub mod reconcile;
pub mod sentiment;
pub mod supervisor;

pub use error::EngineError;
pub use reconcile::ReconciledBalances;
pub use sentiment::{NeutralSentiment, SentimentSource};
pub use supervisor::{CycleOutcome, TradingSupervisor};
