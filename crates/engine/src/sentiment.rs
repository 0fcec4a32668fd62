use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::EngineError;

/// Source of an aggregate market sentiment score in `[0, 1]`.
///
/// `0` is maximally bearish, `1` maximally bullish. The supervisor
/// compares the score against its configured threshold before every
/// cycle and stands aside when the market looks too fearful.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn market_sentiment(&self) -> Result<Decimal, EngineError>;
}

/// Sentiment source that always reports a neutral market.
///
/// Used when no external sentiment provider is wired in, so the
/// supervisor's gate never blocks trading.
pub struct NeutralSentiment;

#[async_trait]
impl SentimentSource for NeutralSentiment {
    async fn market_sentiment(&self) -> Result<Decimal, EngineError> {
        Ok(dec!(0.5))
    }
}
