pub mod enums;
pub mod error;
pub mod frame;
pub mod portfolio;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{OrderAmount, TradeSide};
pub use error::CoreError;
pub use frame::{AssetFeatures, FeatureFrame, FeatureRow};
pub use portfolio::{HoldingsView, PortfolioState};
pub use structs::{Balance, Candle, TradeInstruction};
