use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// The per-asset technical indicators the policy observes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetFeatures {
    pub close: Decimal,
    pub ma_short: Decimal,
    pub ma_long: Decimal,
    pub rsi: Decimal,
}

/// One time-indexed row of a feature frame, with one `AssetFeatures`
/// entry per tracked product, in product-list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: DateTime<Utc>,
    pub assets: Vec<AssetFeatures>,
}

/// An ordered, deduplicated table of per-asset indicators.
///
/// Rows are strictly ascending by timestamp and every row carries exactly
/// one entry per product. The frame is immutable once built; consumers
/// only read by row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    products: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    /// Validates ordering, deduplication, and product alignment before
    /// accepting the rows. A malformed frame is a producer bug, not
    /// something to repair silently.
    pub fn new(products: Vec<String>, rows: Vec<FeatureRow>) -> Result<Self, CoreError> {
        for (i, row) in rows.iter().enumerate() {
            if row.assets.len() != products.len() {
                return Err(CoreError::MalformedFrame(format!(
                    "row {} has {} asset entries, expected {}",
                    i,
                    row.assets.len(),
                    products.len()
                )));
            }
            if i > 0 && row.timestamp <= rows[i - 1].timestamp {
                return Err(CoreError::MalformedFrame(format!(
                    "row {} timestamp {} is not strictly after its predecessor",
                    i, row.timestamp
                )));
            }
            // Close prices divide rebalancing notionals downstream, so a
            // non-positive close is a producer fault caught here.
            for (j, features) in row.assets.iter().enumerate() {
                if features.close <= Decimal::ZERO {
                    return Err(CoreError::MalformedFrame(format!(
                        "row {} has non-positive close {} for {}",
                        i, features.close, products[j]
                    )));
                }
            }
        }
        Ok(Self { products, rows })
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reads a row by step index, clamped to the last valid row so that
    /// callers at the end of history still get a well-defined view.
    pub fn row(&self, step: usize) -> &FeatureRow {
        let idx = step.min(self.rows.len().saturating_sub(1));
        &self.rows[idx]
    }

    pub fn latest(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }
}

impl FeatureRow {
    /// Close price for the product at `index` in the frame's product list.
    pub fn price(&self, index: usize) -> Decimal {
        self.assets[index].close
    }

    /// Builds the flat observation vector the policy consumes:
    /// `[close, ma_short, ma_long, rsi]` per asset, then
    /// `[net_worth, fraction_in_crypto]`.
    ///
    /// The conversion to `f64` is the same controlled precision trade-off
    /// we accept everywhere the model boundary is crossed.
    pub fn observation(&self, net_worth: Decimal, cash: Decimal) -> Vec<f64> {
        let mut obs = Vec::with_capacity(self.assets.len() * 4 + 2);
        for features in &self.assets {
            obs.push(features.close.to_f64().unwrap_or(0.0));
            obs.push(features.ma_short.to_f64().unwrap_or(0.0));
            obs.push(features.ma_long.to_f64().unwrap_or(0.0));
            obs.push(features.rsi.to_f64().unwrap_or(0.0));
        }

        // Degenerate net worth must not crash the observation path; treat
        // the portfolio as fully invested in that case.
        let fraction_in_crypto = if net_worth > Decimal::ZERO {
            Decimal::ONE - cash / net_worth
        } else {
            Decimal::ONE
        };

        obs.push(net_worth.to_f64().unwrap_or(0.0));
        obs.push(fraction_in_crypto.to_f64().unwrap_or(1.0));
        obs
    }
}
