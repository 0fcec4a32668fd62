use core_types::TradeSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The venue's acknowledgement of a filled market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub product_id: String,
    pub side: TradeSide,
    /// Filled amount in the instruction's denomination (notional for buys,
    /// base units for sells).
    pub filled_amount: Decimal,
    pub fill_price: Decimal,
}
