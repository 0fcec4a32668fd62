// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    Config, Execution, Live, Policy as PolicySettings, Portfolio, RiskManagement, Simulation,
    Synthetic,
};

/// Loads the application configuration from the `config.toml` file.
///
/// This is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, and validates the parameters that every downstream component
/// assumes are sane. A failure here is fatal at startup by design.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
        [portfolio]
        initial_balance = 10000.0
        products = ["BTC-USD", "ETH-USD"]

        [simulation]
        fee_pct = 0.001
        min_trade_value = 0.00000001

        [risk_management]
        max_position_pct = 0.2
        max_drawdown_pct = 0.3

        [execution]
        execution_fraction = 0.5
        min_notional = 5.0
        min_base_size = 0.0001
        notional_dp = 2
        size_dp = 6

        [policy]
        ma_short_period = 50
        ma_long_period = 200
        rsi_period = 14
        rsi_overbought = 70.0

        [live]
        sentiment_threshold = 0.65
        cycle_interval_secs = 300
        retry_interval_secs = 60
        allocation_floor = 0.01
        lookback_hours = 72

        [synthetic]
        seed = 42
        steps = 500
        candle_interval_secs = 3600
    "#;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn sample_config_parses_and_validates() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.portfolio.initial_balance, dec!(10000));
        assert_eq!(config.portfolio.products.len(), 2);
        assert_eq!(config.risk_management.max_drawdown_pct, dec!(0.3));
        assert_eq!(config.execution.execution_fraction, dec!(0.5));
        assert_eq!(config.live.cycle_interval_secs, 300);
    }

    #[test]
    fn rejects_empty_product_list() {
        let broken = SAMPLE.replace(
            "products = [\"BTC-USD\", \"ETH-USD\"]",
            "products = []",
        );
        assert!(matches!(parse(&broken), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        let broken = SAMPLE.replace("max_position_pct = 0.2", "max_position_pct = 1.5");
        assert!(matches!(parse(&broken), Err(ConfigError::Invalid(_))));
    }
}
