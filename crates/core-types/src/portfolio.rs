use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Quantity dust below this is treated as rounding noise and clamped to
/// zero rather than reported as an invariant breach.
const QUANTITY_DUST: Decimal = dec!(0.000000000001);

/// A read-only view of cash and per-asset holdings.
///
/// Both the simulator's authoritative in-memory state and the live
/// supervisor's pull-reconciled balance cache implement this, so the
/// rebalancing math is written once against the trait.
pub trait HoldingsView {
    fn cash(&self) -> Decimal;

    /// Quantity held of the given product; zero if untracked.
    fn quantity(&self, product_id: &str) -> Decimal;

    /// Cash plus mark-to-market value of all holdings. Products without a
    /// mark price contribute nothing, matching how the live loop values
    /// positions from the latest frame row only.
    fn net_worth(&self, prices: &HashMap<String, Decimal>) -> Decimal;
}

/// The mutable record of cash and per-asset holdings for one simulation
/// episode. Owned exclusively by the environment that created it; cash and
/// quantities change only through `apply_buy` / `apply_sell`.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    cash: Decimal,
    holdings: HashMap<String, Decimal>,
}

impl PortfolioState {
    /// Creates a portfolio with the given starting cash and a zero
    /// position in every tracked product.
    pub fn new(initial_cash: Decimal, products: &[String]) -> Self {
        Self {
            cash: initial_cash,
            holdings: products.iter().map(|p| (p.clone(), Decimal::ZERO)).collect(),
        }
    }

    /// Spends `notional` of cash (plus `fee`) on base units at `price`.
    ///
    /// The caller must have checked affordability already; an unaffordable
    /// buy reaching this point is a bug in the rebalancing logic, so it is
    /// reported rather than silently skipped.
    pub fn apply_buy(
        &mut self,
        product_id: &str,
        notional: Decimal,
        fee: Decimal,
        price: Decimal,
    ) -> Result<(), CoreError> {
        let cost = notional + fee;
        if cost > self.cash {
            return Err(CoreError::InsufficientCash {
                required: cost.to_string(),
                available: self.cash.to_string(),
            });
        }
        self.cash -= cost;
        let quantity = self.holdings.entry(product_id.to_string()).or_default();
        *quantity += notional / price;
        Ok(())
    }

    /// Receives `notional` of cash (minus `fee`) for base units at `price`.
    ///
    /// Sells are never gated on cash, but the resulting quantity must stay
    /// non-negative; anything below dust level is an invariant breach.
    pub fn apply_sell(
        &mut self,
        product_id: &str,
        notional: Decimal,
        fee: Decimal,
        price: Decimal,
    ) -> Result<(), CoreError> {
        self.cash += notional - fee;
        let quantity = self.holdings.entry(product_id.to_string()).or_default();
        *quantity -= notional / price;
        if *quantity < Decimal::ZERO {
            if *quantity < -QUANTITY_DUST {
                return Err(CoreError::InvariantViolation(format!(
                    "sell of {} drove {} quantity to {}",
                    notional, product_id, quantity
                )));
            }
            *quantity = Decimal::ZERO;
        }
        Ok(())
    }
}

impl HoldingsView for PortfolioState {
    fn cash(&self) -> Decimal {
        self.cash
    }

    fn quantity(&self, product_id: &str) -> Decimal {
        self.holdings.get(product_id).copied().unwrap_or(Decimal::ZERO)
    }

    fn net_worth(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        let mut net = self.cash;
        for (product_id, quantity) in &self.holdings {
            if let Some(price) = prices.get(product_id) {
                net += *quantity * *price;
            }
        }
        net
    }
}
