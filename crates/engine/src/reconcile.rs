use std::collections::HashMap;

use rust_decimal::Decimal;

use core_types::{Balance, HoldingsView};

/// Holdings snapshot rebuilt from a venue balance poll.
///
/// The supervisor never tracks positions optimistically across cycles;
/// every cycle starts by asking the venue what it actually holds and
/// reconciling that answer into this view. Quantities are keyed by
/// product id so the view plugs into the same rebalancing interface as
/// the backtest ledger.
#[derive(Debug, Clone)]
pub struct ReconciledBalances {
    cash: Decimal,
    quantities: HashMap<String, Decimal>,
}

impl ReconciledBalances {
    /// Builds the view from a raw balance listing.
    ///
    /// The quote currency of the first product (e.g. `USD` in
    /// `BTC-USD`) is treated as cash. Base-currency balances are mapped
    /// back onto the product ids in `products`; currencies with no
    /// matching product are ignored.
    pub fn from_balances(balances: &[Balance], products: &[String]) -> Self {
        let quote = products
            .first()
            .and_then(|p| p.split_once('-').map(|(_, q)| q.to_string()))
            .unwrap_or_else(|| "USD".to_string());

        let by_currency: HashMap<&str, Decimal> = balances
            .iter()
            .map(|b| (b.currency.as_str(), b.amount))
            .collect();

        let cash = by_currency.get(quote.as_str()).copied().unwrap_or_default();
        let quantities = products
            .iter()
            .map(|product| {
                let base = product.split_once('-').map(|(b, _)| b).unwrap_or(product);
                let amount = by_currency.get(base).copied().unwrap_or_default();
                (product.clone(), amount)
            })
            .collect();

        Self { cash, quantities }
    }
}

impl HoldingsView for ReconciledBalances {
    fn cash(&self) -> Decimal {
        self.cash
    }

    fn quantity(&self, product_id: &str) -> Decimal {
        self.quantities
            .get(product_id)
            .copied()
            .unwrap_or_default()
    }

    fn net_worth(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        let positions: Decimal = self
            .quantities
            .iter()
            .map(|(product, qty)| *qty * prices.get(product).copied().unwrap_or_default())
            .sum();
        self.cash + positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn products() -> Vec<String> {
        vec!["BTC-USD".to_string(), "ETH-USD".to_string()]
    }

    #[test]
    fn maps_currencies_onto_products() {
        let balances = vec![
            Balance { currency: "USD".to_string(), amount: dec!(2500) },
            Balance { currency: "BTC".to_string(), amount: dec!(0.05) },
            Balance { currency: "DOGE".to_string(), amount: dec!(9999) },
        ];
        let view = ReconciledBalances::from_balances(&balances, &products());

        assert_eq!(view.cash(), dec!(2500));
        assert_eq!(view.quantity("BTC-USD"), dec!(0.05));
        assert_eq!(view.quantity("ETH-USD"), Decimal::ZERO);
    }

    #[test]
    fn net_worth_marks_positions_to_market() {
        let balances = vec![
            Balance { currency: "USD".to_string(), amount: dec!(1000) },
            Balance { currency: "BTC".to_string(), amount: dec!(0.1) },
            Balance { currency: "ETH".to_string(), amount: dec!(2) },
        ];
        let view = ReconciledBalances::from_balances(&balances, &products());

        let mut prices = HashMap::new();
        prices.insert("BTC-USD".to_string(), dec!(50000));
        prices.insert("ETH-USD".to_string(), dec!(3000));

        // 1000 + 0.1 * 50000 + 2 * 3000
        assert_eq!(view.net_worth(&prices), dec!(12000));
    }

    #[test]
    fn missing_balances_default_to_zero() {
        let view = ReconciledBalances::from_balances(&[], &products());
        assert_eq!(view.cash(), Decimal::ZERO);
        assert_eq!(view.net_worth(&HashMap::new()), Decimal::ZERO);
    }
}
