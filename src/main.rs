use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

use api_client::PaperClient;
use configuration::load_config;
use engine::{NeutralSentiment, TradingSupervisor};
use market_data::{PriceSink, SyntheticFeed};
use policy::MomentumPolicy;
use risk::RiskManager;
use simulator::{run_episode, SimulationEnv};

/// The main entry point for the Meridian portfolio engine.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    match cli.command {
        Commands::Simulate(args) => handle_simulate(args, config),
        Commands::Trade => handle_trade(config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// An autonomous multi-asset portfolio engine with a simulated market
/// and a live paper-trading loop.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the baseline policy through one episode on a synthetic market.
    Simulate(SimulateArgs),

    /// Run the live supervising loop against the in-process paper venue.
    Trade,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Override the random seed of the synthetic market.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of synthetic candles per product.
    #[arg(long)]
    steps: Option<usize>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_simulate(args: SimulateArgs, mut config: configuration::Config) -> anyhow::Result<()> {
    if let Some(seed) = args.seed {
        config.synthetic.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.synthetic.steps = steps;
    }

    let feed = SyntheticFeed::new(
        &config.portfolio.products,
        &config.synthetic,
        config.policy.clone(),
        Utc::now(),
    );
    let frame = feed.full_frame()?;

    let risk = RiskManager::new(
        config.risk_management.clone(),
        config.portfolio.products.len(),
    )?;
    let mut env = SimulationEnv::new(
        frame,
        config.simulation.clone(),
        config.portfolio.initial_balance,
        risk,
    )?;
    let mut policy = MomentumPolicy::new(&config.policy, config.portfolio.products.len())?;

    let report = run_episode(&mut env, &mut policy)?;

    println!("Episode complete over {} steps", report.steps);
    println!("  Initial net worth: {:.2}", report.initial_net_worth);
    println!("  Final net worth:   {:.2}", report.final_net_worth);
    println!("  Total return:      {:.2}%", report.total_return_pct());
    println!("  Max drawdown:      {:.2}%", report.max_drawdown * dec!(100));
    println!("  Trades executed:   {}", report.trades_executed);
    println!("  Fees paid:         {:.2}", report.fees_paid);

    Ok(())
}

async fn handle_trade(config: configuration::Config) -> anyhow::Result<()> {
    // The feed publishes its latest closes into the shared price map the
    // paper venue marks fills against, so both sides see one market.
    let prices: PriceSink = Arc::new(Mutex::new(HashMap::new()));

    let feed = SyntheticFeed::new(
        &config.portfolio.products,
        &config.synthetic,
        config.policy.clone(),
        Utc::now(),
    )
    .with_price_sink(prices.clone());

    let exchange = PaperClient::new(
        config.portfolio.initial_balance,
        config.simulation.fee_pct,
        prices,
    );

    let policy = MomentumPolicy::new(&config.policy, config.portfolio.products.len())?;
    let mut supervisor = TradingSupervisor::new(
        &config,
        Arc::new(exchange),
        Arc::new(feed),
        Arc::new(NeutralSentiment),
        Box::new(policy),
    )?;

    supervisor.run().await?;
    Ok(())
}
