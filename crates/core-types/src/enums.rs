use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// The sizing of a trade instruction.
///
/// Buys are expressed in quote currency (a USD notional), sells in base
/// units, mirroring how market orders are sized on the venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderAmount {
    /// An amount of quote currency (USD) to spend.
    Notional(Decimal),
    /// An amount of base units (e.g. BTC) to sell.
    BaseSize(Decimal),
}

impl OrderAmount {
    /// The raw magnitude, regardless of denomination.
    pub fn value(&self) -> Decimal {
        match self {
            OrderAmount::Notional(v) | OrderAmount::BaseSize(v) => *v,
        }
    }
}
