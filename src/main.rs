use anyhow::Result;
use clap::Parser;
use tellus_core::AppConfig;
use tellus_lib::runner::Simulation;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Tellus world simulation", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the world seed
    #[arg(short, long)]
    seed: Option<u32>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,

    /// Resume from a saved state instead of generating a world
    #[arg(long)]
    load: Option<String>,

    /// Save the final state to this path
    #[arg(long)]
    save: Option<String>,

    /// Append live events to this JSONL file
    #[arg(long)]
    events_log: Option<String>,

    /// Write the final snapshot as JSON to this path
    #[arg(long)]
    snapshot: Option<String>,

    /// Disable the evolutionary world-genesis tuner
    #[arg(long)]
    no_genesis: bool,
}

fn load_config(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(_) => {
            tracing::info!(path, "no config file, using defaults");
            Ok(AppConfig::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if args.no_genesis {
        config.genesis.enabled = false;
    }

    let mut sim = match &args.load {
        Some(path) => Simulation::from_save(path, config)?,
        None => Simulation::from_config(config, None)?,
    };

    let mut logger = args
        .events_log
        .as_ref()
        .map(tellus_io::HistoryLogger::new);

    tracing::info!(
        seed = sim.world.seed,
        width = sim.world.width,
        height = sim.world.height,
        ticks = args.ticks,
        "simulation starting"
    );

    // Run in bounded chunks so the event log flushes as we go.
    let chunk = 200u64;
    let mut remaining = args.ticks;
    while remaining > 0 {
        let step = chunk.min(remaining);
        let events = sim.run(step).await?;
        if let Some(logger) = logger.as_mut() {
            logger.record_all(events);
            logger.flush()?;
        }
        remaining -= step;
    }

    let species = sim.species_stats();
    let snapshot = sim.civ.snapshot(&sim.world, &species);
    tracing::info!(
        tick = snapshot.world.tick,
        factions = snapshot.factions.len(),
        agents = sim.civ.agents.len(),
        timeline = snapshot.timeline.len(),
        territory_version = snapshot.territory_version,
        elapsed_s = sim.metrics.elapsed().as_secs_f64(),
        "simulation finished"
    );

    if let Some(path) = &args.snapshot {
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        tracing::info!(path, "snapshot written");
    }
    if let Some(path) = &args.save {
        sim.save(path)?;
    }

    Ok(())
}
