//! The venue seam.
//!
//! `ExchangeClient` is the contract the supervising loop uses to talk to
//! a trading venue: fire-and-forget order placement plus a balance query
//! that is the only source of truth for live holdings. A real HTTP client
//! lives outside this core; `PaperClient` is the in-process venue used by
//! tests and the demo.

use async_trait::async_trait;
use core_types::{Balance, TradeInstruction};

pub mod error;
pub mod paper;
pub mod receipts;

pub use error::ApiError;
pub use paper::{PaperClient, PriceMap};
pub use receipts::OrderReceipt;

/// The generic, abstract interface for a trading venue.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Fetches the current balance of every currency in the account.
    /// The supervisor rebuilds its whole view of live holdings from this
    /// each cycle; nothing is trusted from earlier cycles.
    async fn balances(&self) -> Result<Vec<Balance>, ApiError>;

    /// Places a market order. The receipt is used only for logging; state
    /// is reconciled from the next balance poll, never from the receipt.
    async fn place_market_order(
        &self,
        instruction: &TradeInstruction,
    ) -> Result<OrderReceipt, ApiError>;
}
