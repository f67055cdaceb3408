//! Horse Race CLI
//!
//! Plays a full race session and prints the standings.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use horse_race_lib::{format_duration, run_session, SessionConfig, SessionSnapshot};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "horse-race", about = "Run a horse race session")]
struct Args {
    /// JSON session config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Playback delay multiplier (0 resolves rounds immediately)
    #[arg(long)]
    playback_scale: Option<f64>,

    /// Print the final session state as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> anyhow::Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(scale) = args.playback_scale {
        config.playback_scale = scale;
    }
    Ok(config)
}

fn print_standings(snapshot: &SessionSnapshot) {
    for result in &snapshot.race_results {
        println!("Round {} - {}m", result.round, result.distance);
        for (place, entry) in result.results.iter().enumerate() {
            println!(
                "  {:>2}. {:<10} {:>9}",
                place + 1,
                entry.horse.name,
                format_duration(entry.finish_time)
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let snapshot = run_session(config).await.context("race session failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_standings(&snapshot);
    }
    Ok(())
}
