//! Portfolio-level risk constraints.
//!
//! The `RiskManager` is the single gate between a raw target-allocation
//! vector and the rebalancing math. It carries one piece of state, the
//! running peak net worth, which shares the lifetime of the environment
//! or supervisor instance that owns it.

use configuration::RiskManagement;
use rust_decimal::Decimal;
use tracing::warn;

pub mod error;

pub use error::RiskError;

/// Bounds raw target allocations by position and drawdown limits.
#[derive(Debug, Clone)]
pub struct RiskManager {
    params: RiskManagement,
    n_assets: usize,
    /// Running maximum of observed net worth. Monotonically non-decreasing;
    /// reset only by constructing a new instance (or `reset`).
    peak_net_worth: Option<Decimal>,
}

impl RiskManager {
    /// Creates a new `RiskManager` for a fixed-size asset universe.
    ///
    /// Validates that the configured limits are logical fractions.
    pub fn new(params: RiskManagement, n_assets: usize) -> Result<Self, RiskError> {
        if params.max_position_pct <= Decimal::ZERO || params.max_position_pct > Decimal::ONE {
            return Err(RiskError::InvalidParameters(
                "max_position_pct must be in (0, 1]".to_string(),
            ));
        }
        if params.max_drawdown_pct <= Decimal::ZERO || params.max_drawdown_pct >= Decimal::ONE {
            return Err(RiskError::InvalidParameters(
                "max_drawdown_pct must be in (0, 1)".to_string(),
            ));
        }
        if n_assets == 0 {
            return Err(RiskError::InvalidParameters(
                "asset universe must not be empty".to_string(),
            ));
        }
        Ok(Self {
            params,
            n_assets,
            peak_net_worth: None,
        })
    }

    /// Clears the peak tracker, as on environment reset.
    pub fn reset(&mut self) {
        self.peak_net_worth = None;
    }

    /// Applies the risk constraints to a raw target-allocation vector.
    ///
    /// 1. Updates the running peak net worth.
    /// 2. If the drawdown from peak exceeds `max_drawdown_pct`, returns the
    ///    all-zero vector (a full retreat to cash, never a partial one).
    /// 3. Otherwise clamps each component into `[0, max_position_pct]` and,
    ///    if the clamped sum exceeds 1, rescales proportionally so the cash
    ///    fraction stays non-negative while relative weights are preserved.
    ///
    /// A wrong-length vector is a contract violation on the caller's side
    /// and is reported, not repaired.
    pub fn constrain(
        &mut self,
        allocation: &[Decimal],
        net_worth: Decimal,
    ) -> Result<Vec<Decimal>, RiskError> {
        if allocation.len() != self.n_assets {
            return Err(RiskError::AllocationLength {
                expected: self.n_assets,
                got: allocation.len(),
            });
        }

        let peak = match self.peak_net_worth {
            Some(peak) => peak.max(net_worth),
            None => net_worth,
        };
        self.peak_net_worth = Some(peak);

        if peak > Decimal::ZERO {
            let drawdown = Decimal::ONE - net_worth / peak;
            if drawdown > self.params.max_drawdown_pct {
                warn!(
                    %drawdown,
                    %peak,
                    %net_worth,
                    "max drawdown breached, forcing full retreat to cash"
                );
                return Ok(vec![Decimal::ZERO; self.n_assets]);
            }
        }

        let mut bounded: Vec<Decimal> = allocation
            .iter()
            .map(|a| (*a).clamp(Decimal::ZERO, self.params.max_position_pct))
            .collect();

        let sum: Decimal = bounded.iter().sum();
        if sum > Decimal::ONE {
            for component in &mut bounded {
                *component /= sum;
            }
        }

        Ok(bounded)
    }

    /// The highest net worth seen so far, if any cycle has run.
    pub fn peak_net_worth(&self) -> Option<Decimal> {
        self.peak_net_worth
    }
}
