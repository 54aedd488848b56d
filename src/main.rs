use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{Config, WriteLogger};

use gridsnake::config::GameConfig;
use gridsnake::game::SnakeGame;

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Grid snake in the terminal")]
struct Cli {
    /// Board width in cells
    #[arg(long, default_value = "20")]
    width: i32,

    /// Board height in cells
    #[arg(long, default_value = "20")]
    height: i32,

    /// Milliseconds between game steps
    #[arg(long, default_value = "80")]
    tick_ms: u64,

    /// Don't ring the terminal bell on eating and dying
    #[arg(long)]
    mute: bool,

    /// Write a log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level used with --log-file
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the game, so logs can only go to a file
    if let Some(path) = &cli.log_file {
        let file = File::create(path).with_context(|| format!("Error creating log file {}", path.display()))?;
        WriteLogger::init(cli.log_level, Config::default(), file).context("Error initializing logger")?;
    }

    let config = GameConfig {
        tick_ms: cli.tick_ms,
        ..GameConfig::new(cli.width, cli.height)
    };
    config.validate()?;
    info!("starting with {:?}", config);

    let mut game = SnakeGame::new(config, !cli.mute)?;
    game.run()
}
