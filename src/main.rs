use clap::Parser;
use config::SeedSetting;
use log::{error, info, LevelFilter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::PathBuf;

mod app;
mod config;
mod core;
mod game;
mod headless;

#[derive(Parser, Debug)]
#[command(name = "fretfall", about = "Five-lane falling-note rhythm game")]
struct Args {
    /// Path to the INI config file (created with defaults if missing).
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run this many frames without a window, printing JSON-lines events.
    #[arg(long)]
    headless: Option<u64>,

    /// Let the engine play itself (headless only).
    #[arg(long)]
    autoplay: bool,

    /// Include per-frame note positions in the headless event stream.
    #[arg(long)]
    positions: bool,

    /// Overrides the config's spawn seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn make_rng(seed: SeedSetting) -> StdRng {
    match seed {
        SeedSetting::Fixed(seed) => StdRng::seed_from_u64(seed),
        SeedSetting::Random => StdRng::from_os_rng(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("fretfall::game::events", LevelFilter::Info)
        .filter_module("fretfall::game::gameplay", LevelFilter::Info)
        .init();

    let args = Args::parse();
    info!("Application starting...");

    config::load(&args.config);
    let config = config::get();
    let seed = args.seed.map_or(config.seed, SeedSetting::Fixed);
    let rng = make_rng(seed);

    if let Some(frames) = args.headless {
        let options = headless::Options {
            frames,
            autoplay: args.autoplay,
            positions: args.positions,
        };
        let stdout = std::io::stdout().lock();
        if let Err(e) = headless::run(&config, rng, options, stdout) {
            error!("Headless run failed: {}", e);
            return Err(e);
        }
        return Ok(());
    }

    if let Err(e) = app::run(rng) {
        error!("Application exited with error: {}", e);
        return Err(e);
    }

    info!("Application exited gracefully.");
    Ok(())
}
