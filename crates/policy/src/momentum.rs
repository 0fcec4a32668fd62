use crate::error::PolicyError;
use crate::{observation_len, Policy, OBS_PER_ASSET};
use configuration::PolicySettings;
use rust_decimal::prelude::*;
use tracing::debug;

/// A trend-following baseline: allocate an equal share of net worth to
/// every asset whose short MA is above its long MA, unless RSI says the
/// move is exhausted. Assets out of trend get zero and fall back to cash.
pub struct MomentumPolicy {
    n_assets: usize,
    rsi_overbought: f64,
}

impl MomentumPolicy {
    pub fn new(params: &PolicySettings, n_assets: usize) -> Result<Self, PolicyError> {
        if n_assets == 0 {
            return Err(PolicyError::InvalidParameters(
                "asset universe must not be empty".to_string(),
            ));
        }
        Ok(Self {
            n_assets,
            rsi_overbought: params.rsi_overbought.to_f64().unwrap_or(70.0),
        })
    }
}

impl Policy for MomentumPolicy {
    fn predict(&mut self, observation: &[f64]) -> Result<Vec<Decimal>, PolicyError> {
        let expected = observation_len(self.n_assets);
        if observation.len() != expected {
            return Err(PolicyError::ObservationLength {
                expected,
                got: observation.len(),
            });
        }

        let equal_share = 1.0 / self.n_assets as f64;
        let mut allocation = Vec::with_capacity(self.n_assets);

        for asset in 0..self.n_assets {
            let base = asset * OBS_PER_ASSET;
            let ma_short = observation[base + 1];
            let ma_long = observation[base + 2];
            let rsi = observation[base + 3];

            let in_trend = ma_short > ma_long && rsi < self.rsi_overbought;
            let target = if in_trend { equal_share } else { 0.0 };
            allocation.push(Decimal::from_f64(target).unwrap_or_default());
        }

        debug!(?allocation, "momentum policy decision");
        Ok(allocation)
    }
}
