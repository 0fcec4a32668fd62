use crate::error::SimulationError;
use configuration::Simulation;
use core_types::{FeatureFrame, HoldingsView, PortfolioState};
use risk::RiskManager;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::trace;

/// The result of one environment transition.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub observation: Vec<f64>,
    /// Single-period P&L: new net worth minus net worth before the step.
    pub reward: Decimal,
    pub done: bool,
    pub net_worth: Decimal,
}

/// A step-indexed portfolio state machine over a feature frame.
///
/// Each `step` applies risk constraints to the requested allocation,
/// rebalances against the current row's prices with proportional fees,
/// then advances the cursor. Past the last row the environment stays
/// infinitely queryable: the final observation repeats with zero reward
/// and no state change.
pub struct SimulationEnv {
    frame: FeatureFrame,
    params: Simulation,
    initial_balance: Decimal,

    portfolio: PortfolioState,
    risk: RiskManager,
    step: usize,
    exhausted: bool,

    trades_executed: u64,
    fees_paid: Decimal,
}

impl SimulationEnv {
    pub fn new(
        frame: FeatureFrame,
        params: Simulation,
        initial_balance: Decimal,
        risk: RiskManager,
    ) -> Result<Self, SimulationError> {
        if frame.is_empty() {
            return Err(SimulationError::EmptyFrame);
        }
        let portfolio = PortfolioState::new(initial_balance, frame.products());
        Ok(Self {
            frame,
            params,
            initial_balance,
            portfolio,
            risk,
            step: 0,
            exhausted: false,
            trades_executed: 0,
            fees_paid: Decimal::ZERO,
        })
    }

    /// Resets to a fresh episode: step 0, initial cash, zero holdings,
    /// cleared risk peak. Returns the initial observation.
    pub fn reset(&mut self) -> Vec<f64> {
        self.step = 0;
        self.exhausted = false;
        self.portfolio = PortfolioState::new(self.initial_balance, self.frame.products());
        self.risk.reset();
        self.trades_executed = 0;
        self.fees_paid = Decimal::ZERO;
        self.observation()
    }

    /// The observation at the current cursor: per-asset features then
    /// `[net_worth, fraction_in_crypto]`.
    pub fn observation(&self) -> Vec<f64> {
        let row = self.frame.row(self.step);
        let net_worth = self.portfolio.net_worth(&self.prices_at(self.step));
        row.observation(net_worth, self.portfolio.cash())
    }

    /// Applies one target-allocation action and advances the cursor.
    pub fn step(&mut self, action: &[Decimal]) -> Result<StepOutcome, SimulationError> {
        if self.exhausted {
            let net_worth = self.portfolio.net_worth(&self.prices_at(self.step));
            return Ok(StepOutcome {
                observation: self.observation(),
                reward: Decimal::ZERO,
                done: true,
                net_worth,
            });
        }

        let row = self.frame.row(self.step).clone();
        let prices = self.prices_at(self.step);
        let current_net_worth = self.portfolio.net_worth(&prices);

        let bounded = self.risk.constrain(action, current_net_worth)?;

        for (i, product_id) in self.frame.products().to_vec().iter().enumerate() {
            let price = row.price(i);
            let target_value = bounded[i] * current_net_worth;
            let current_value = self.portfolio.quantity(product_id) * price;
            let diff = target_value - current_value;

            if diff.abs() < self.params.min_trade_value {
                continue;
            }

            let fee = diff.abs() * self.params.fee_pct;
            if diff > Decimal::ZERO {
                // Buys must be affordable including the fee; an
                // unaffordable buy stands down for this step.
                if diff + fee > self.portfolio.cash() {
                    trace!(%product_id, %diff, "buy skipped, insufficient cash");
                    continue;
                }
                self.portfolio.apply_buy(product_id, diff, fee, price)?;
            } else {
                self.portfolio.apply_sell(product_id, diff.abs(), fee, price)?;
            }
            self.trades_executed += 1;
            self.fees_paid += fee;
        }

        self.step += 1;
        if self.step >= self.frame.len() {
            // Clamp so observations stay well-defined past termination.
            self.step = self.frame.len() - 1;
            self.exhausted = true;
        }

        let new_net_worth = self.portfolio.net_worth(&self.prices_at(self.step));
        Ok(StepOutcome {
            observation: self.observation(),
            reward: new_net_worth - current_net_worth,
            done: self.exhausted,
            net_worth: new_net_worth,
        })
    }

    fn prices_at(&self, step: usize) -> HashMap<String, Decimal> {
        let row = self.frame.row(step);
        self.frame
            .products()
            .iter()
            .enumerate()
            .map(|(i, product_id)| (product_id.clone(), row.price(i)))
            .collect()
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    pub fn frame(&self) -> &FeatureFrame {
        &self.frame
    }

    pub fn trades_executed(&self) -> u64 {
        self.trades_executed
    }

    pub fn fees_paid(&self) -> Decimal {
        self.fees_paid
    }
}
