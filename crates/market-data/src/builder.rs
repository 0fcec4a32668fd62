use crate::error::MarketDataError;
use crate::indicators;
use chrono::{DateTime, Utc};
use configuration::PolicySettings;
use core_types::{AssetFeatures, Candle, FeatureFrame, FeatureRow};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Merges per-product candle history into a single multi-asset frame.
///
/// Each product's candles are sorted and deduplicated by timestamp, run
/// through the indicator pipeline, and then joined on timestamp. Only
/// timestamps present for every product survive the join, so a row always
/// carries a complete set of asset features.
pub fn build_frame(
    products: &[String],
    candles_by_product: &HashMap<String, Vec<Candle>>,
    params: &PolicySettings,
) -> Result<FeatureFrame, MarketDataError> {
    let mut per_product: Vec<BTreeMap<DateTime<Utc>, AssetFeatures>> =
        Vec::with_capacity(products.len());

    for product_id in products {
        let candles = candles_by_product
            .get(product_id)
            .ok_or_else(|| MarketDataError::MissingProduct(product_id.clone()))?;

        let mut cleaned: Vec<Candle> = candles.clone();
        cleaned.sort_by_key(|c| c.open_time);
        cleaned.dedup_by_key(|c| c.open_time);

        let closes: Vec<_> = cleaned.iter().map(|c| c.close).collect();
        let series = indicators::compute(&closes, params)?;

        let mut by_time = BTreeMap::new();
        for (i, candle) in cleaned.iter().enumerate() {
            by_time.insert(
                candle.open_time,
                AssetFeatures {
                    close: candle.close,
                    ma_short: series.ma_short[i],
                    ma_long: series.ma_long[i],
                    rsi: series.rsi[i],
                },
            );
        }
        per_product.push(by_time);
    }

    // Inner join on timestamp: keep only rows where every product has data.
    let mut rows = Vec::new();
    if let Some(first) = per_product.first() {
        'times: for timestamp in first.keys() {
            let mut assets = Vec::with_capacity(products.len());
            for by_time in &per_product {
                match by_time.get(timestamp) {
                    Some(features) => assets.push(*features),
                    None => continue 'times,
                }
            }
            rows.push(FeatureRow {
                timestamp: *timestamp,
                assets,
            });
        }
    }

    debug!(
        rows = rows.len(),
        products = products.len(),
        "built multi-asset feature frame"
    );

    Ok(FeatureFrame::new(products.to_vec(), rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn params() -> PolicySettings {
        PolicySettings {
            ma_short_period: 2,
            ma_long_period: 3,
            rsi_period: 2,
            rsi_overbought: dec!(70),
        }
    }

    fn candle(secs: i64, close: Decimal) -> Candle {
        Candle {
            open_time: Utc.timestamp_opt(secs, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1),
        }
    }

    #[test]
    fn join_keeps_only_shared_timestamps() {
        let products = vec!["BTC-USD".to_string(), "ETH-USD".to_string()];
        let candles = HashMap::from([
            (
                "BTC-USD".to_string(),
                vec![candle(100, dec!(10)), candle(200, dec!(11)), candle(300, dec!(12))],
            ),
            (
                "ETH-USD".to_string(),
                vec![candle(200, dec!(5)), candle(300, dec!(6))],
            ),
        ]);

        let frame = build_frame(&products, &candles, &params()).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.row(0).timestamp, Utc.timestamp_opt(200, 0).unwrap());
        assert_eq!(frame.row(0).price(0), dec!(11));
        assert_eq!(frame.row(0).price(1), dec!(5));
    }

    #[test]
    fn duplicate_and_unsorted_candles_are_cleaned() {
        let products = vec!["BTC-USD".to_string()];
        let candles = HashMap::from([(
            "BTC-USD".to_string(),
            vec![candle(300, dec!(12)), candle(100, dec!(10)), candle(100, dec!(99))],
        )]);

        let frame = build_frame(&products, &candles, &params()).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.row(0).price(0), dec!(10));
        assert_eq!(frame.row(1).price(0), dec!(12));
    }

    #[test]
    fn missing_product_is_an_error() {
        let products = vec!["BTC-USD".to_string()];
        let err = build_frame(&products, &HashMap::new(), &params()).unwrap_err();
        assert!(matches!(err, MarketDataError::MissingProduct(_)));
    }
}
