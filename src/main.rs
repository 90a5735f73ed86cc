use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use snake_sim::episode::{self, DEFAULT_STEP_LIMIT, EpisodeReport};
use snake_sim::{GameConfig, Genome, Greedy, NeuralPolicy};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyKind {
    /// Food-chasing heuristic.
    Greedy,
    /// Feed-forward network from `--genome`, or a random one.
    Neural,
}

#[derive(Debug, Parser)]
#[command(name = "snake-sim", about = "Run headless Snake episodes")]
struct Args {
    /// TOML game config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    #[arg(long, value_enum, default_value_t = PolicyKind::Greedy)]
    policy: PolicyKind,
    #[arg(long, default_value_t = DEFAULT_STEP_LIMIT)]
    max_steps: u64,
    /// Base seed; episode i uses seed + i.
    #[arg(long)]
    seed: Option<u64>,
    /// JSON weight vector for the neural policy.
    #[arg(long)]
    genome: Option<PathBuf>,
    /// Print reports as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let base_seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(|| rand::thread_rng().r#gen());
    info!(
        width = config.grid_width,
        height = config.grid_height,
        episodes = args.episodes,
        policy = ?args.policy,
        base_seed,
        "starting run"
    );

    let reports = match args.policy {
        PolicyKind::Greedy => {
            episode::evaluate_batch(&config, vec![Greedy; args.episodes], args.max_steps, base_seed)?
        }
        PolicyKind::Neural => {
            let genome = load_genome(args.genome.as_ref(), base_seed)?;
            let policy = NeuralPolicy::new(&genome, config.grid_width);
            episode::evaluate_batch(&config, vec![policy; args.episodes], args.max_steps, base_seed)?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    summarize(&reports);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_genome(path: Option<&PathBuf>, seed: u64) -> Result<Genome> {
    match path {
        Some(path) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("reading genome {}", path.display()))?;
            Genome::from_json(&src).with_context(|| format!("parsing genome {}", path.display()))
        }
        None => {
            warn!("no --genome given, using random weights");
            Ok(Genome::random(&mut SmallRng::seed_from_u64(seed)))
        }
    }
}

fn summarize(reports: &[EpisodeReport]) {
    if reports.is_empty() {
        warn!("no episodes were run");
        return;
    }
    let n = reports.len() as f64;
    let best = reports.iter().map(|r| r.score).max().unwrap_or(0);
    let mean_score = reports.iter().map(|r| f64::from(r.score)).sum::<f64>() / n;
    let mean_steps = reports.iter().map(|r| r.steps as f64).sum::<f64>() / n;
    let best_fitness = reports
        .iter()
        .map(|r| r.fitness)
        .fold(f64::NEG_INFINITY, f64::max);
    info!(
        episodes = reports.len(),
        best_score = best,
        mean_score,
        mean_steps,
        best_fitness,
        "run complete"
    );
}
