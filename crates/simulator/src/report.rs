use crate::env::SimulationEnv;
use crate::error::SimulationError;
use indicatif::{ProgressBar, ProgressStyle};
use policy::Policy;
use rust_decimal::prelude::*;
use tracing::info;

/// Summary statistics for one completed episode.
#[derive(Debug, Clone)]
pub struct EpisodeReport {
    pub steps: usize,
    pub initial_net_worth: Decimal,
    pub final_net_worth: Decimal,
    pub total_reward: Decimal,
    /// Largest fractional decline from the running net-worth peak.
    pub max_drawdown: Decimal,
    pub trades_executed: u64,
    pub fees_paid: Decimal,
}

impl EpisodeReport {
    pub fn total_return_pct(&self) -> Decimal {
        if self.initial_net_worth.is_zero() {
            return Decimal::ZERO;
        }
        (self.final_net_worth - self.initial_net_worth) / self.initial_net_worth
            * Decimal::ONE_HUNDRED
    }
}

/// Drives a policy through a full episode over the environment's frame.
///
/// The loop is the offline mirror of one live cycle: observe, decide,
/// constrain, rebalance, repeat until the frame is exhausted.
pub fn run_episode(
    env: &mut SimulationEnv,
    policy: &mut dyn Policy,
) -> Result<EpisodeReport, SimulationError> {
    let mut observation = env.reset();
    let initial_net_worth = observation[observation.len() - 2];
    let initial_net_worth = Decimal::from_f64(initial_net_worth).unwrap_or_default();

    let total_steps = env.frame().len();
    let progress_bar = ProgressBar::new(total_steps as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut total_reward = Decimal::ZERO;
    let mut peak = initial_net_worth;
    let mut max_drawdown = Decimal::ZERO;
    let mut final_net_worth = initial_net_worth;
    let mut steps = 0;

    loop {
        let action = policy.predict(&observation)?;
        let outcome = env.step(&action)?;

        observation = outcome.observation;
        total_reward += outcome.reward;
        final_net_worth = outcome.net_worth;
        steps += 1;

        peak = peak.max(outcome.net_worth);
        if peak > Decimal::ZERO {
            max_drawdown = max_drawdown.max(Decimal::ONE - outcome.net_worth / peak);
        }

        progress_bar.inc(1);
        if outcome.done {
            break;
        }
    }

    progress_bar.finish_and_clear();

    let report = EpisodeReport {
        steps,
        initial_net_worth,
        final_net_worth,
        total_reward,
        max_drawdown,
        trades_executed: env.trades_executed(),
        fees_paid: env.fees_paid(),
    };
    info!(
        steps = report.steps,
        %report.final_net_worth,
        %report.total_reward,
        "episode complete"
    );
    Ok(report)
}
