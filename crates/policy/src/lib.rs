//! The decision-policy seam.
//!
//! The core has zero compile-time dependency on any specific learning
//! algorithm: anything that maps an observation vector to a target
//! allocation vector can drive it. A trained RL model plugs in behind
//! this trait; `MomentumPolicy` is the hand-written baseline that stands
//! in for one.

use rust_decimal::Decimal;

pub mod error;
pub mod momentum;

pub use error::PolicyError;
pub use momentum::MomentumPolicy;

/// Number of feature values per asset in an observation vector, followed
/// by the two portfolio entries `[net_worth, fraction_in_crypto]`.
pub const OBS_PER_ASSET: usize = 4;

/// Maps an observation vector to a target-allocation vector.
///
/// The returned vector has one entry per tracked asset, each intended to
/// lie in `[0, 1]` as a fraction of net worth. It need not sum to 1; the
/// cash fraction absorbs the remainder. `&mut self` allows stateful
/// policies (recurrent models, warm-started indicators).
pub trait Policy: Send + Sync {
    fn predict(&mut self, observation: &[f64]) -> Result<Vec<Decimal>, PolicyError>;
}

/// Expected observation length for `n_assets` tracked products.
pub fn observation_len(n_assets: usize) -> usize {
    n_assets * OBS_PER_ASSET + 2
}
