use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hurricane_sim::{
    scheduler::QueuedFrames,
    wind::{season_path, Season, SeasonalWindData},
    ConfigLoader, Engine,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless hurricane motion simulation")]
struct Cli {
    /// Path to the engine configuration YAML file
    #[arg(long, default_value = "scenarios/atlantic.yaml")]
    config: PathBuf,

    /// Directory holding the seasonal wind datasets and SST rasters
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the configured season
    #[arg(long, value_enum)]
    season: Option<Season>,

    /// Override the configured random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many steps even if the hurricane is still active
    #[arg(long, default_value_t = 20_000)]
    max_steps: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::new(".").load(&cli.config)?;
    if let Some(season) = cli.season {
        config.season = season;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let data = config.data.clone();
    let wind = SeasonalWindData::load_dir(&data.dir, &data.wind_pattern)?;
    tracing::info!(
        dir = %data.dir.display(),
        seasons = ?wind.seasons().collect::<Vec<_>>(),
        "loaded wind data"
    );
    let mut engine = Engine::new(config, wind, QueuedFrames::new())?;

    if let Some(request) = engine.raster_request() {
        let path = season_path(&data.dir, &data.raster_pattern, request.season);
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read SST raster {}", path.display()))?;
        engine
            .complete_raster_load(request.season, &bytes)
            .with_context(|| format!("Failed to load SST raster {}", path.display()))?;
    }

    engine.start()?;
    let steps = 1 + engine.run_frames(cli.max_steps.saturating_sub(1));
    tracing::info!(
        steps,
        finished = engine.is_finished(),
        steps_per_second = engine.steps_per_second().unwrap_or(0.0),
        "run complete"
    );

    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}
