use crate::error::ExecutorError;
use configuration::Execution;
use core_types::{OrderAmount, TradeInstruction, TradeSide};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Converts a desired per-asset value delta into a concrete buy/sell
/// instruction.
///
/// The planner is the live-path counterpart of the simulator's rebalance
/// math: same delta, same fee model, but instead of mutating holdings it
/// emits an instruction for the venue. It deliberately executes only a
/// fraction of the delta per cycle to reduce overshoot against a moving
/// price, and drops sub-threshold deltas silently. It never touches
/// portfolio state; the next balance poll is the source of truth.
#[derive(Debug, Clone)]
pub struct ExecutionPlanner {
    params: Execution,
    fee_pct: Decimal,
}

impl ExecutionPlanner {
    pub fn new(params: Execution, fee_pct: Decimal) -> Result<Self, ExecutorError> {
        if params.execution_fraction <= Decimal::ZERO || params.execution_fraction > Decimal::ONE {
            return Err(ExecutorError::InvalidParameters(
                "execution_fraction must be in (0, 1]".to_string(),
            ));
        }
        if params.min_notional <= Decimal::ZERO || params.min_base_size <= Decimal::ZERO {
            return Err(ExecutorError::InvalidParameters(
                "minimum trade thresholds must be positive".to_string(),
            ));
        }
        Ok(Self { params, fee_pct })
    }

    /// Plans one instruction for a single asset.
    ///
    /// `diff` is the full value delta toward the target (positive to buy,
    /// negative to sell), in quote currency. Returns `Ok(None)` when the
    /// executed fraction falls below the venue minimums; that is a normal
    /// outcome, not an error.
    pub fn plan(
        &self,
        product_id: &str,
        diff: Decimal,
        price: Decimal,
    ) -> Result<Option<TradeInstruction>, ExecutorError> {
        if price <= Decimal::ZERO {
            return Err(ExecutorError::InvalidPrice(price));
        }

        let executed = diff * self.params.execution_fraction;
        let fee = executed.abs() * self.fee_pct;

        let instruction = if executed > Decimal::ZERO {
            let notional = executed;
            if notional < self.params.min_notional {
                debug!(%product_id, %notional, "buy below minimum notional, dropped");
                return Ok(None);
            }
            // Gating happens before rounding, so a rounded amount can only
            // hit zero through a misconfigured dp; fall back to the gate
            // minimum rather than emit a zero-size order.
            let mut rounded = notional.round_dp(self.params.notional_dp);
            if rounded.is_zero() {
                rounded = self.params.min_notional;
            }
            TradeInstruction {
                instruction_id: Uuid::new_v4(),
                product_id: product_id.to_string(),
                side: TradeSide::Buy,
                amount: OrderAmount::Notional(rounded),
                estimated_fee: fee,
            }
        } else {
            let size = executed.abs() / price;
            if size < self.params.min_base_size {
                debug!(%product_id, %size, "sell below minimum base size, dropped");
                return Ok(None);
            }
            let mut rounded = size.round_dp(self.params.size_dp);
            if rounded.is_zero() {
                rounded = self.params.min_base_size;
            }
            TradeInstruction {
                instruction_id: Uuid::new_v4(),
                product_id: product_id.to_string(),
                side: TradeSide::Sell,
                amount: OrderAmount::BaseSize(rounded),
                estimated_fee: fee,
            }
        };

        Ok(Some(instruction))
    }
}
