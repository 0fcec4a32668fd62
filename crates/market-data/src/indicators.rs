use crate::error::MarketDataError;
use configuration::PolicySettings;
use rust_decimal::prelude::*;
use ta::indicators::{RelativeStrengthIndex as Rsi, SimpleMovingAverage as Sma};
use ta::Next;

/// The indicator columns computed for one product's close series, aligned
/// index-for-index with the input candles.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub ma_short: Vec<Decimal>,
    pub ma_long: Vec<Decimal>,
    pub rsi: Vec<Decimal>,
}

/// Streams SMA(short), SMA(long), and RSI over a close series.
///
/// The `ta` crate computes over `f64`; we convert from `Decimal` on the
/// way in and back on the way out. During the warm-up window `ta` yields
/// the average over the bars seen so far rather than NaN, which spares us
/// the forward-fill step the equivalent batch pipeline would need.
pub fn compute(
    closes: &[Decimal],
    params: &PolicySettings,
) -> Result<IndicatorSeries, MarketDataError> {
    let mut ma_short = Sma::new(params.ma_short_period)
        .map_err(|e| MarketDataError::InvalidIndicatorParams(e.to_string()))?;
    let mut ma_long = Sma::new(params.ma_long_period)
        .map_err(|e| MarketDataError::InvalidIndicatorParams(e.to_string()))?;
    let mut rsi = Rsi::new(params.rsi_period)
        .map_err(|e| MarketDataError::InvalidIndicatorParams(e.to_string()))?;

    let mut series = IndicatorSeries {
        ma_short: Vec::with_capacity(closes.len()),
        ma_long: Vec::with_capacity(closes.len()),
        rsi: Vec::with_capacity(closes.len()),
    };

    for close in closes {
        let close_f64 = close.to_f64().unwrap_or(0.0);
        series
            .ma_short
            .push(Decimal::from_f64(ma_short.next(close_f64)).unwrap_or_default());
        series
            .ma_long
            .push(Decimal::from_f64(ma_long.next(close_f64)).unwrap_or_default());
        series
            .rsi
            .push(Decimal::from_f64(rsi.next(close_f64)).unwrap_or_default());
    }

    Ok(series)
}
