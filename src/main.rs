use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use torus_snake::game::GameConfig;
use torus_snake::modes::HumanMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "torus_snake")]
#[command(version, about = "Snake on a wrap-around board")]
struct Cli {
    /// TOML file with game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid side length (odd, at least 5)
    #[arg(long)]
    size: Option<usize>,

    /// Game ticks per second
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write logs; the terminal itself is taken by the game
    #[arg(long, default_value = "torus_snake.log")]
    log_file: PathBuf,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(size) = self.size {
            config.grid_size = size;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate = tick_rate;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = cli.game_config()?;
    info!(?config, seed = ?cli.seed, "Starting game");

    let mut human_mode = HumanMode::new(config, cli.seed)?;
    let summary = human_mode.run().await?;

    println!("{}", summary);
    Ok(())
}
