use crate::error::ApiError;
use crate::receipts::OrderReceipt;
use crate::ExchangeClient;
use async_trait::async_trait;
use core_types::{Balance, OrderAmount, TradeInstruction, TradeSide};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Latest mark prices, shared with whatever feed is driving the session.
pub type PriceMap = std::sync::Arc<std::sync::Mutex<HashMap<String, Decimal>>>;

/// An in-process venue that fills market orders instantly at the shared
/// mark price. Balances behave like a real account: buys are rejected
/// when cash runs short, sells when units do.
pub struct PaperClient {
    prices: PriceMap,
    fee_pct: Decimal,
    account: Mutex<HashMap<String, Decimal>>,
}

impl PaperClient {
    pub fn new(initial_cash: Decimal, fee_pct: Decimal, prices: PriceMap) -> Self {
        Self {
            prices,
            fee_pct,
            account: Mutex::new(HashMap::from([("USD".to_string(), initial_cash)])),
        }
    }

    /// Base currency of a product id like "BTC-USD".
    fn base_currency(product_id: &str) -> &str {
        product_id.split('-').next().unwrap_or(product_id)
    }

    fn mark_price(&self, product_id: &str) -> Result<Decimal, ApiError> {
        self.prices
            .lock()
            .expect("price map lock poisoned")
            .get(product_id)
            .copied()
            .ok_or_else(|| ApiError::MissingPrice(product_id.to_string()))
    }
}

#[async_trait]
impl ExchangeClient for PaperClient {
    async fn balances(&self) -> Result<Vec<Balance>, ApiError> {
        let account = self.account.lock().await;
        Ok(account
            .iter()
            .map(|(currency, amount)| Balance {
                currency: currency.clone(),
                amount: *amount,
            })
            .collect())
    }

    async fn place_market_order(
        &self,
        instruction: &TradeInstruction,
    ) -> Result<OrderReceipt, ApiError> {
        let price = self.mark_price(&instruction.product_id)?;
        let base = Self::base_currency(&instruction.product_id).to_string();
        let mut account = self.account.lock().await;

        match (instruction.side, instruction.amount) {
            (TradeSide::Buy, OrderAmount::Notional(notional)) => {
                let cost = notional * (Decimal::ONE + self.fee_pct);
                let cash = account.entry("USD".to_string()).or_default();
                if cost > *cash {
                    return Err(ApiError::Rejected(format!(
                        "insufficient cash: need {}, have {}",
                        cost, cash
                    )));
                }
                *cash -= cost;
                *account.entry(base.clone()).or_default() += notional / price;
            }
            (TradeSide::Sell, OrderAmount::BaseSize(size)) => {
                let held = account.entry(base.clone()).or_default();
                if size > *held {
                    return Err(ApiError::Rejected(format!(
                        "insufficient {}: need {}, have {}",
                        base, size, held
                    )));
                }
                *held -= size;
                let proceeds = size * price * (Decimal::ONE - self.fee_pct);
                *account.entry("USD".to_string()).or_default() += proceeds;
            }
            (side, amount) => {
                return Err(ApiError::Rejected(format!(
                    "mismatched side/amount: {:?} with {:?}",
                    side, amount
                )));
            }
        }

        let receipt = OrderReceipt {
            order_id: Uuid::new_v4(),
            product_id: instruction.product_id.clone(),
            side: instruction.side,
            filled_amount: instruction.amount.value(),
            fill_price: price,
        };
        info!(?receipt, "paper fill");
        Ok(receipt)
    }
}
