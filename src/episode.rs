use crate::brain::{Genome, NeuralPolicy};
use crate::config::{ConfigError, GameConfig};
use crate::game::{Game, GameOverCause, StepOutcome};
use crate::policy::Policy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_STEP_LIMIT: u64 = 3000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub score: u32,
    pub steps: u64,
    pub energy_left: i32,
    pub length: usize,
    /// `None` when the step limit was hit first.
    pub cause: Option<GameOverCause>,
    pub fitness: f64,
}

/// Food dominates; leftover energy per step and survival time add small bonuses.
pub fn fitness(food_eaten: u32, steps: u64, energy_left: i32) -> f64 {
    let food = f64::from(food_eaten) * 100.0;
    let efficiency = if steps > 0 {
        f64::from(energy_left) / steps as f64 * 50.0
    } else {
        0.0
    };
    let survival = (steps as f64 / 100.0).min(50.0);
    food + efficiency + survival
}

/// One driver tick: sense, decide, act.
pub fn tick<P: Policy + ?Sized>(game: &mut Game, policy: &mut P) -> StepOutcome {
    let observation = game.observation();
    let action = policy.decide(&observation);
    game.apply_action(action);
    game.step()
}

pub fn run_episode<P: Policy + ?Sized>(game: &mut Game, policy: &mut P, step_limit: u64) -> EpisodeReport {
    while !game.is_over() && game.ticks() < step_limit {
        tick(game, policy);
    }
    let report = EpisodeReport {
        score: game.score(),
        steps: game.ticks(),
        energy_left: game.energy(),
        length: game.snake().len(),
        cause: game.game_over().map(|over| over.cause),
        fitness: fitness(game.score(), game.ticks(), game.energy()),
    };
    info!(
        score = report.score,
        steps = report.steps,
        cause = ?report.cause,
        fitness = report.fitness,
        "episode finished"
    );
    report
}

/// Runs one isolated game per policy on the rayon pool. Game `i` is seeded
/// with `base_seed + i`, so a batch is reproducible regardless of scheduling.
pub fn evaluate_batch<P>(
    config: &GameConfig,
    policies: Vec<P>,
    step_limit: u64,
    base_seed: u64,
) -> Result<Vec<EpisodeReport>, ConfigError>
where
    P: Policy + Send,
{
    config.validate()?;
    policies
        .into_par_iter()
        .enumerate()
        .map(|(i, mut policy)| {
            let cfg = config.clone().with_seed(base_seed.wrapping_add(i as u64));
            let mut game = Game::new(cfg)?;
            Ok(run_episode(&mut game, &mut policy, step_limit))
        })
        .collect()
}

pub fn evaluate_population(
    config: &GameConfig,
    genomes: &[Genome],
    step_limit: u64,
    base_seed: u64,
) -> Result<Vec<EpisodeReport>, ConfigError> {
    let policies: Vec<NeuralPolicy> = genomes
        .iter()
        .map(|g| NeuralPolicy::new(g, config.grid_width))
        .collect();
    evaluate_batch(config, policies, step_limit, base_seed)
}
