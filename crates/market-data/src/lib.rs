//! Market data acquisition and feature construction.
//!
//! This crate turns raw candle history into the ordered, deduplicated
//! `FeatureFrame` the environment and the live supervisor consume. The
//! `FeatureSource` trait is the seam behind which a real venue data feed
//! (or the synthetic demo feed) lives.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::FeatureFrame;

pub mod builder;
pub mod error;
pub mod indicators;
pub mod synthetic;

pub use builder::build_frame;
pub use error::MarketDataError;
pub use synthetic::{PriceSink, SyntheticFeed};

/// A provider of time-ordered, deduplicated feature rows.
///
/// Implementations own fetching and cleaning; consumers only read.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Returns the feature frame covering `[start, end]`, rows ascending
    /// by timestamp. An empty frame is a valid answer (data unavailability
    /// is the caller's recoverable condition, not an error here).
    async fn frame(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FeatureFrame, MarketDataError>;
}
