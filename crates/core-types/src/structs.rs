use crate::enums::{OrderAmount, TradeSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single OHLCV bar for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// One currency entry from the venue's balance query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub amount: Decimal,
}

/// A concrete, venue-safe order produced by the execution planner.
///
/// Ephemeral: produced and consumed within one rebalancing cycle, never
/// used to update portfolio state directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInstruction {
    pub instruction_id: Uuid,
    pub product_id: String,
    pub side: TradeSide,
    pub amount: OrderAmount,
    pub estimated_fee: Decimal,
}
