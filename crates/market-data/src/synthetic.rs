use crate::builder::build_frame;
use crate::error::MarketDataError;
use crate::FeatureSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use configuration::{PolicySettings, Synthetic};
use core_types::{Candle, FeatureFrame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

/// A map of latest mark prices, shared with the paper venue so fills
/// happen at the same price the supervisor last observed.
pub type PriceSink = Arc<Mutex<HashMap<String, Decimal>>>;

/// A deterministic random-walk market feed for demos and offline episodes.
///
/// Candle history is generated once at construction from the configured
/// seed; `frame` then serves any sub-window of it. No network, fully
/// reproducible.
pub struct SyntheticFeed {
    products: Vec<String>,
    policy_params: PolicySettings,
    candles: HashMap<String, Vec<Candle>>,
    price_sink: Option<PriceSink>,
}

impl SyntheticFeed {
    pub fn new(
        products: &[String],
        settings: &Synthetic,
        policy_params: PolicySettings,
        end: DateTime<Utc>,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let interval = Duration::seconds(settings.candle_interval_secs);
        let start = end - interval * settings.steps as i32;

        let mut candles = HashMap::new();
        for product_id in products {
            // Each product walks from its own base price with a mild drift.
            let mut price: f64 = rng.gen_range(50.0..5000.0);
            let drift: f64 = rng.gen_range(-0.0005..0.001);

            let mut series = Vec::with_capacity(settings.steps);
            for step in 0..settings.steps {
                let change_pct = drift + rng.gen_range(-0.01..0.01);
                let open = price;
                price *= 1.0 + change_pct;
                let (high, low) = (open.max(price) * 1.001, open.min(price) * 0.999);

                series.push(Candle {
                    open_time: start + interval * step as i32,
                    open: Decimal::from_f64(open).unwrap_or_default().round_dp(6),
                    high: Decimal::from_f64(high).unwrap_or_default().round_dp(6),
                    low: Decimal::from_f64(low).unwrap_or_default().round_dp(6),
                    close: Decimal::from_f64(price).unwrap_or_default().round_dp(6),
                    volume: Decimal::from_f64(rng.gen_range(1.0..100.0))
                        .unwrap_or_default()
                        .round_dp(2),
                });
            }
            candles.insert(product_id.clone(), series);
        }

        info!(
            products = products.len(),
            steps = settings.steps,
            seed = settings.seed,
            "generated synthetic candle history"
        );

        Self {
            products: products.to_vec(),
            policy_params,
            candles,
            price_sink: None,
        }
    }

    /// Attaches a shared price map that gets refreshed with the latest
    /// closes every time a frame is served.
    pub fn with_price_sink(mut self, sink: PriceSink) -> Self {
        self.price_sink = Some(sink);
        self
    }

    /// The full generated history as one frame, for offline episodes.
    pub fn full_frame(&self) -> Result<FeatureFrame, MarketDataError> {
        build_frame(&self.products, &self.candles, &self.policy_params)
    }
}

#[async_trait]
impl FeatureSource for SyntheticFeed {
    async fn frame(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FeatureFrame, MarketDataError> {
        let windowed: HashMap<String, Vec<Candle>> = self
            .candles
            .iter()
            .map(|(product_id, series)| {
                let in_range = series
                    .iter()
                    .filter(|c| c.open_time >= start && c.open_time <= end)
                    .copied()
                    .collect();
                (product_id.clone(), in_range)
            })
            .collect();

        let frame = build_frame(&self.products, &windowed, &self.policy_params)?;

        if let (Some(sink), Some(latest)) = (&self.price_sink, frame.latest()) {
            let mut prices = sink.lock().expect("price sink lock poisoned");
            for (i, product_id) in frame.products().iter().enumerate() {
                prices.insert(product_id.clone(), latest.price(i));
            }
        }

        Ok(frame)
    }
}
