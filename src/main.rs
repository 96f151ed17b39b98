use clap::Parser;
use flotilla::simulation::generation::GenerationManager;
use flotilla::simulation::params::SimulationParams;
use flotilla::simulation::report::EvolutionSnapshot;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless runner for the flotilla evolution loop.
#[derive(Debug, Parser)]
#[command(name = "flotilla", version, about = "Evolving boats, pirates, and navy patrols")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "flotilla.toml")]
    config: PathBuf,
    /// Number of rounds to simulate before exiting.
    #[arg(long, default_value_t = 10)]
    rounds: u32,
    /// Simulation ticks per simulated second.
    #[arg(long, default_value_t = 50.0)]
    tick_rate: f32,
    /// Overrides the configured per-round seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured artifacts directory.
    #[arg(long)]
    artifacts: Option<PathBuf>,
    /// Restores parent pools from a snapshot file before the first round.
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Writes the final parent pools to a snapshot file on exit.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    anyhow::ensure!(args.tick_rate > 0.0, "tick rate must be positive");

    let mut params = SimulationParams::load_or_default(&args.config)?;
    if let Some(seed) = args.seed {
        params.round_seed = seed;
    }
    if let Some(dir) = args.artifacts {
        params.artifacts_dir = dir;
    }

    let mut manager = GenerationManager::new(params)?;
    if let Some(path) = &args.resume {
        let snapshot = EvolutionSnapshot::load_from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load snapshot {}: {e}", path.display()))?;
        manager.restore(snapshot);
        manager.resume()?;
    } else {
        manager.start();
    }

    let dt = 1.0 / args.tick_rate;
    let mut completed = 0u32;
    while completed < args.rounds {
        if manager.tick(dt)? {
            completed += 1;
        }
    }
    manager.stop();

    if let Some(path) = &args.snapshot {
        manager
            .snapshot()
            .save_to_file(path)
            .map_err(|e| anyhow::anyhow!("failed to write snapshot {}: {e}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    info!(rounds = completed, generation = manager.generation(), "run complete");
    Ok(())
}
