use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use api_client::ExchangeClient;
use configuration::Config;
use core_types::HoldingsView;
use executor::ExecutionPlanner;
use market_data::FeatureSource;
use policy::Policy;
use risk::RiskManager;

use crate::error::EngineError;
use crate::reconcile::ReconciledBalances;
use crate::sentiment::SentimentSource;

/// What a single live cycle amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Market sentiment fell below the gate; no trading this cycle.
    SentimentBypass { score: Decimal },
    /// The cycle ran to completion. `failed` counts per-asset faults that
    /// were isolated and logged without aborting the cycle.
    Traded { placed: usize, failed: usize },
}

/// Drives the live trading loop.
///
/// Each cycle polls sentiment, balances, and market data, asks the
/// policy for a target allocation, constrains it, and hands per-asset
/// deltas to the planner and venue. One misbehaving asset never aborts
/// the cycle; a failed poll aborts the cycle but not the loop.
pub struct TradingSupervisor {
    products: Vec<String>,
    live: configuration::Live,
    exchange: Arc<dyn ExchangeClient>,
    features: Arc<dyn FeatureSource>,
    sentiment: Arc<dyn SentimentSource>,
    policy: Box<dyn Policy>,
    risk: RiskManager,
    planner: ExecutionPlanner,
}

impl TradingSupervisor {
    pub fn new(
        config: &Config,
        exchange: Arc<dyn ExchangeClient>,
        features: Arc<dyn FeatureSource>,
        sentiment: Arc<dyn SentimentSource>,
        policy: Box<dyn Policy>,
    ) -> Result<Self, EngineError> {
        let products = config.portfolio.products.clone();
        let risk = RiskManager::new(config.risk_management.clone(), products.len())
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let planner = ExecutionPlanner::new(config.execution.clone(), config.simulation.fee_pct)
            .map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(Self {
            products,
            live: config.live.clone(),
            exchange,
            features,
            sentiment,
            policy,
            risk,
            planner,
        })
    }

    /// Runs cycles forever. Recoverable cycle failures are logged and
    /// retried after the short backoff; a successful cycle sleeps the
    /// full interval.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        info!(products = ?self.products, "trading supervisor started");
        loop {
            let delay = match self.run_cycle().await {
                Ok(CycleOutcome::SentimentBypass { score }) => {
                    info!(%score, "sentiment below threshold, standing aside this cycle");
                    Duration::from_secs(self.live.cycle_interval_secs)
                }
                Ok(CycleOutcome::Traded { placed, failed }) => {
                    info!(placed, failed, "cycle complete");
                    Duration::from_secs(self.live.cycle_interval_secs)
                }
                Err(e) if e.is_recoverable() => {
                    error!(error = %e, "cycle failed, retrying after backoff");
                    Duration::from_secs(self.live.retry_interval_secs)
                }
                Err(e) => return Err(e),
            };
            tokio::time::sleep(delay).await;
        }
    }

    /// Executes exactly one trading cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, EngineError> {
        let score = self.sentiment.market_sentiment().await?;
        if score < Decimal::ONE - self.live.sentiment_threshold {
            return Ok(CycleOutcome::SentimentBypass { score });
        }

        // Holdings are rebuilt from the venue every cycle; nothing is
        // carried over from earlier order placements.
        let balances = self.exchange.balances().await?;
        let view = ReconciledBalances::from_balances(&balances, &self.products);

        let end = Utc::now();
        let start = end - ChronoDuration::hours(self.live.lookback_hours);
        let frame = self.features.frame(start, end).await?;
        // Per-asset indexing below assumes the feed tracks exactly our
        // products, in our order. A divergent frame would misprice every
        // asset, so it is refused and the cycle retried.
        if frame.products() != self.products.as_slice() {
            return Err(EngineError::DataUnavailable(format!(
                "feature frame tracks {:?}, expected {:?}",
                frame.products(),
                self.products
            )));
        }
        let row = frame
            .latest()
            .ok_or_else(|| EngineError::DataUnavailable("feature frame is empty".to_string()))?;

        let prices: std::collections::HashMap<String, Decimal> = self
            .products
            .iter()
            .enumerate()
            .map(|(i, product)| (product.clone(), row.price(i)))
            .collect();
        let net_worth = view.net_worth(&prices);

        let observation = row.observation(net_worth, view.cash());
        let mut allocation = self.policy.predict(&observation)?;
        for component in &mut allocation {
            if component.abs() < self.live.allocation_floor {
                *component = Decimal::ZERO;
            }
        }

        let bounded = self.risk.constrain(&allocation, net_worth)?;

        let mut placed = 0;
        let mut failed = 0;
        for (i, product) in self.products.iter().enumerate() {
            let price = row.price(i);
            let current_value = view.quantity(product) * price;
            let diff = bounded[i] * net_worth - current_value;

            let instruction = match self.planner.plan(product, diff, price) {
                Ok(Some(instruction)) => instruction,
                Ok(None) => continue,
                Err(e) => {
                    warn!(%product, error = %e, "planning failed for asset, skipping");
                    failed += 1;
                    continue;
                }
            };

            match self.exchange.place_market_order(&instruction).await {
                Ok(receipt) => {
                    info!(
                        %product,
                        side = ?instruction.side,
                        amount = %instruction.amount.value(),
                        order_id = %receipt.order_id,
                        "order placed"
                    );
                    placed += 1;
                }
                Err(e) => {
                    warn!(%product, error = %e, "order rejected, continuing with remaining assets");
                    failed += 1;
                }
            }
        }

        Ok(CycleOutcome::Traded { placed, failed })
    }

    /// The highest net worth observed so far, if any cycle has run.
    pub fn peak_net_worth(&self) -> Option<Decimal> {
        self.risk.peak_net_worth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use api_client::{ApiError, OrderReceipt};
    use core_types::{
        AssetFeatures, Balance, FeatureFrame, FeatureRow, TradeInstruction,
    };
    use market_data::MarketDataError;
    use policy::PolicyError;

    fn config() -> Config {
        Config {
            portfolio: configuration::Portfolio {
                initial_balance: dec!(10000),
                products: vec!["BTC-USD".to_string(), "ETH-USD".to_string()],
            },
            simulation: configuration::Simulation {
                fee_pct: dec!(0.001),
                min_trade_value: dec!(1),
            },
            risk_management: configuration::RiskManagement {
                max_position_pct: dec!(0.2),
                max_drawdown_pct: dec!(0.3),
            },
            execution: configuration::Execution {
                execution_fraction: dec!(0.5),
                min_notional: dec!(5),
                min_base_size: dec!(0.0001),
                notional_dp: 2,
                size_dp: 6,
            },
            policy: configuration::PolicySettings {
                ma_short_period: 5,
                ma_long_period: 20,
                rsi_period: 14,
                rsi_overbought: dec!(70),
            },
            live: configuration::Live {
                sentiment_threshold: dec!(0.65),
                cycle_interval_secs: 300,
                retry_interval_secs: 60,
                allocation_floor: dec!(0.01),
                lookback_hours: 72,
            },
            synthetic: configuration::Synthetic {
                seed: 42,
                steps: 64,
                candle_interval_secs: 3600,
            },
        }
    }

    fn frame_with_closes(closes: &[Decimal]) -> FeatureFrame {
        let products: Vec<String> = vec!["BTC-USD".to_string(), "ETH-USD".to_string()];
        let row = FeatureRow {
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            assets: closes
                .iter()
                .map(|close| AssetFeatures {
                    close: *close,
                    ma_short: dec!(2),
                    ma_long: dec!(1),
                    rsi: dec!(50),
                })
                .collect(),
        };
        FeatureFrame::new(products, vec![row]).unwrap()
    }

    struct StubFeed {
        frame: FeatureFrame,
    }

    #[async_trait]
    impl FeatureSource for StubFeed {
        async fn frame(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<FeatureFrame, MarketDataError> {
            Ok(self.frame.clone())
        }
    }

    struct EmptyFeed;

    #[async_trait]
    impl FeatureSource for EmptyFeed {
        async fn frame(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<FeatureFrame, MarketDataError> {
            Ok(FeatureFrame::new(
                vec!["BTC-USD".to_string(), "ETH-USD".to_string()],
                Vec::new(),
            )
            .unwrap())
        }
    }

    struct FixedSentiment(Decimal);

    #[async_trait]
    impl SentimentSource for FixedSentiment {
        async fn market_sentiment(&self) -> Result<Decimal, EngineError> {
            Ok(self.0)
        }
    }

    /// Venue stub with programmable balances and an optional product whose
    /// orders are always rejected.
    struct StubExchange {
        balances: Vec<Balance>,
        fail_balances: bool,
        reject_product: Option<String>,
        placed: Mutex<Vec<TradeInstruction>>,
    }

    impl StubExchange {
        fn with_cash(cash: Decimal) -> Self {
            Self {
                balances: vec![Balance {
                    currency: "USD".to_string(),
                    amount: cash,
                }],
                fail_balances: false,
                reject_product: None,
                placed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExchangeClient for StubExchange {
        async fn balances(&self) -> Result<Vec<Balance>, ApiError> {
            if self.fail_balances {
                return Err(ApiError::Balance("balance endpoint unavailable".to_string()));
            }
            Ok(self.balances.clone())
        }

        async fn place_market_order(
            &self,
            instruction: &TradeInstruction,
        ) -> Result<OrderReceipt, ApiError> {
            if self.reject_product.as_deref() == Some(instruction.product_id.as_str()) {
                return Err(ApiError::Rejected(format!(
                    "{}: size below venue increment",
                    instruction.product_id
                )));
            }
            self.placed.lock().unwrap().push(instruction.clone());
            Ok(OrderReceipt {
                order_id: uuid::Uuid::new_v4(),
                product_id: instruction.product_id.clone(),
                side: instruction.side,
                filled_amount: instruction.amount.value(),
                fill_price: dec!(100),
            })
        }
    }

    /// Always wants the same allocation vector.
    struct ConstantPolicy(Vec<Decimal>);

    impl Policy for ConstantPolicy {
        fn predict(&mut self, _observation: &[f64]) -> Result<Vec<Decimal>, PolicyError> {
            Ok(self.0.clone())
        }
    }

    fn supervisor(
        exchange: Arc<StubExchange>,
        features: Arc<dyn FeatureSource>,
        sentiment: Arc<dyn SentimentSource>,
        allocation: Vec<Decimal>,
    ) -> TradingSupervisor {
        TradingSupervisor::new(
            &config(),
            exchange,
            features,
            sentiment,
            Box::new(ConstantPolicy(allocation)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn bearish_sentiment_bypasses_the_cycle() {
        let exchange = Arc::new(StubExchange::with_cash(dec!(10000)));
        let mut supervisor = supervisor(
            exchange.clone(),
            Arc::new(StubFeed {
                frame: frame_with_closes(&[dec!(100), dec!(50)]),
            }),
            Arc::new(FixedSentiment(dec!(0.2))),
            vec![dec!(0.2), dec!(0.2)],
        );

        let outcome = supervisor.run_cycle().await.unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::SentimentBypass { score: dec!(0.2) }
        );
        assert!(exchange.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn healthy_cycle_places_buys_toward_target() {
        let exchange = Arc::new(StubExchange::with_cash(dec!(10000)));
        let mut supervisor = supervisor(
            exchange.clone(),
            Arc::new(StubFeed {
                frame: frame_with_closes(&[dec!(100), dec!(50)]),
            }),
            Arc::new(FixedSentiment(dec!(0.5))),
            vec![dec!(0.2), dec!(0.1)],
        );

        let outcome = supervisor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Traded { placed: 2, failed: 0 });

        let placed = exchange.placed.lock().unwrap();
        // 0.2 * 10000 halved and 0.1 * 10000 halved.
        assert_eq!(placed[0].amount.value(), dec!(1000));
        assert_eq!(placed[1].amount.value(), dec!(500));
    }

    #[tokio::test]
    async fn one_rejected_asset_does_not_abort_the_cycle() {
        let mut exchange = StubExchange::with_cash(dec!(10000));
        exchange.reject_product = Some("BTC-USD".to_string());
        let exchange = Arc::new(exchange);

        let mut supervisor = supervisor(
            exchange.clone(),
            Arc::new(StubFeed {
                frame: frame_with_closes(&[dec!(100), dec!(50)]),
            }),
            Arc::new(FixedSentiment(dec!(0.5))),
            vec![dec!(0.2), dec!(0.1)],
        );

        let outcome = supervisor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Traded { placed: 1, failed: 1 });
        assert_eq!(
            exchange.placed.lock().unwrap()[0].product_id,
            "ETH-USD"
        );
    }

    #[tokio::test]
    async fn balance_failure_is_a_recoverable_cycle_error() {
        let mut exchange = StubExchange::with_cash(dec!(10000));
        exchange.fail_balances = true;
        let exchange = Arc::new(exchange);

        let mut supervisor = supervisor(
            exchange,
            Arc::new(StubFeed {
                frame: frame_with_closes(&[dec!(100), dec!(50)]),
            }),
            Arc::new(FixedSentiment(dec!(0.5))),
            vec![dec!(0.2), dec!(0.1)],
        );

        let err = supervisor.run_cycle().await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, EngineError::Exchange(_)));
    }

    #[tokio::test]
    async fn empty_frame_is_a_recoverable_cycle_error() {
        let exchange = Arc::new(StubExchange::with_cash(dec!(10000)));
        let mut supervisor = supervisor(
            exchange,
            Arc::new(EmptyFeed),
            Arc::new(FixedSentiment(dec!(0.5))),
            vec![dec!(0.2), dec!(0.1)],
        );

        let err = supervisor.run_cycle().await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, EngineError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn frame_with_divergent_products_is_a_recoverable_cycle_error() {
        let exchange = Arc::new(StubExchange::with_cash(dec!(10000)));
        // The feed serves a well-formed frame, but for a single product
        // while the supervisor tracks two.
        let narrow = FeatureFrame::new(
            vec!["BTC-USD".to_string()],
            vec![FeatureRow {
                timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                assets: vec![AssetFeatures {
                    close: dec!(100),
                    ma_short: dec!(2),
                    ma_long: dec!(1),
                    rsi: dec!(50),
                }],
            }],
        )
        .unwrap();

        let mut supervisor = supervisor(
            exchange.clone(),
            Arc::new(StubFeed { frame: narrow }),
            Arc::new(FixedSentiment(dec!(0.5))),
            vec![dec!(0.2), dec!(0.1)],
        );

        let err = supervisor.run_cycle().await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, EngineError::DataUnavailable(_)));
        assert!(exchange.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dust_allocations_are_floored_to_zero() {
        let exchange = Arc::new(StubExchange::with_cash(dec!(10000)));
        let mut supervisor = supervisor(
            exchange.clone(),
            Arc::new(StubFeed {
                frame: frame_with_closes(&[dec!(100), dec!(50)]),
            }),
            Arc::new(FixedSentiment(dec!(0.5))),
            // Below the 0.01 allocation floor; would otherwise buy $25.
            vec![dec!(0.005), dec!(0.005)],
        );

        let outcome = supervisor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Traded { placed: 0, failed: 0 });
        assert!(exchange.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_holdings_shrink_the_buy_delta() {
        let exchange = Arc::new(StubExchange {
            balances: vec![
                Balance { currency: "USD".to_string(), amount: dec!(9000) },
                Balance { currency: "BTC".to_string(), amount: dec!(10) },
            ],
            fail_balances: false,
            reject_product: None,
            placed: Mutex::new(Vec::new()),
        });

        let mut supervisor = supervisor(
            exchange.clone(),
            Arc::new(StubFeed {
                frame: frame_with_closes(&[dec!(100), dec!(50)]),
            }),
            Arc::new(FixedSentiment(dec!(0.5))),
            vec![dec!(0.2), Decimal::ZERO],
        );

        let outcome = supervisor.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Traded { placed: 1, failed: 0 });

        // Net worth 10000, target 0.2 * 10000 = 2000, held 1000, delta
        // 1000 halved by the execution fraction.
        let placed = exchange.placed.lock().unwrap();
        assert_eq!(placed[0].amount.value(), dec!(500));
    }
}
