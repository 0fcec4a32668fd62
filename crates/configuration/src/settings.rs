use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portfolio: Portfolio,
    pub simulation: Simulation,
    pub risk_management: RiskManagement,
    pub execution: Execution,
    pub policy: Policy,
    pub live: Live,
    pub synthetic: Synthetic,
}

/// The tracked asset universe and starting capital.
#[derive(Debug, Clone, Deserialize)]
pub struct Portfolio {
    /// Starting cash balance for a simulation episode, in USD.
    pub initial_balance: Decimal,
    /// Tracked products (e.g., "BTC-USD"). Order defines the layout of
    /// allocation and observation vectors everywhere in the system.
    pub products: Vec<String>,
}

/// Parameters for the simulation environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Simulation {
    /// Proportional transaction fee. 0.001 corresponds to 0.1%.
    pub fee_pct: Decimal,
    /// Value deltas below this are treated as a no-op rather than traded.
    pub min_trade_value: Decimal,
}

/// Portfolio-level risk limits.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskManagement {
    /// Maximum fraction of net worth in any single asset (e.g. 0.2).
    pub max_position_pct: Decimal,
    /// Drawdown from peak net worth beyond which all risk is cut (e.g. 0.3).
    pub max_drawdown_pct: Decimal,
}

/// Parameters for translating value deltas into venue-safe orders.
#[derive(Debug, Clone, Deserialize)]
pub struct Execution {
    /// Fraction of the computed delta executed per cycle, to reduce
    /// overshoot against a moving live price.
    pub execution_fraction: Decimal,
    /// Smallest USD notional worth sending to the venue.
    pub min_notional: Decimal,
    /// Smallest base-unit size worth sending to the venue.
    pub min_base_size: Decimal,
    /// Decimal places for rounded USD notionals.
    pub notional_dp: u32,
    /// Decimal places for rounded base-unit sizes.
    pub size_dp: u32,
}

/// Parameters for the baseline momentum policy.
#[derive(Debug, Clone, Deserialize)]
pub struct Policy {
    pub ma_short_period: usize,
    pub ma_long_period: usize,
    pub rsi_period: usize,
    /// RSI level above which the policy stands aside on an asset.
    pub rsi_overbought: Decimal,
}

/// Parameters for the live supervising loop.
#[derive(Debug, Clone, Deserialize)]
pub struct Live {
    /// Trading is bypassed for a cycle when market sentiment drops below
    /// `1 - sentiment_threshold`.
    pub sentiment_threshold: Decimal,
    /// Delay between successful cycles, in seconds.
    pub cycle_interval_secs: u64,
    /// Shorter backoff after a recoverable failure, in seconds.
    pub retry_interval_secs: u64,
    /// Allocation entries with magnitude below this are zeroed to avoid
    /// churn from numerical noise.
    pub allocation_floor: Decimal,
    /// How much candle history to fetch when building the live frame.
    pub lookback_hours: i64,
}

/// Parameters for the synthetic market feed used by the demo commands.
#[derive(Debug, Clone, Deserialize)]
pub struct Synthetic {
    pub seed: u64,
    pub steps: usize,
    pub candle_interval_secs: i64,
}

impl Config {
    /// Checks the cross-cutting assumptions the rest of the system relies
    /// on. Anything wrong here aborts startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolio.products.is_empty() {
            return Err(ConfigError::Invalid(
                "portfolio.products must list at least one product".to_string(),
            ));
        }
        if self.portfolio.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "portfolio.initial_balance must be positive".to_string(),
            ));
        }
        if self.simulation.fee_pct < Decimal::ZERO || self.simulation.fee_pct >= Decimal::ONE {
            return Err(ConfigError::Invalid(
                "simulation.fee_pct must be in [0, 1)".to_string(),
            ));
        }
        for (name, value) in [
            ("risk_management.max_position_pct", self.risk_management.max_position_pct),
            ("risk_management.max_drawdown_pct", self.risk_management.max_drawdown_pct),
            ("execution.execution_fraction", self.execution.execution_fraction),
        ] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.live.sentiment_threshold < Decimal::ZERO
            || self.live.sentiment_threshold > Decimal::ONE
        {
            return Err(ConfigError::Invalid(
                "live.sentiment_threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.policy.ma_short_period >= self.policy.ma_long_period {
            return Err(ConfigError::Invalid(
                "policy.ma_short_period must be less than policy.ma_long_period".to_string(),
            ));
        }
        if self.live.allocation_floor < Decimal::ZERO
            || self.live.allocation_floor >= dec!(0.5)
        {
            return Err(ConfigError::Invalid(
                "live.allocation_floor must be a small non-negative fraction".to_string(),
            ));
        }
        Ok(())
    }
}
