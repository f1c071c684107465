use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use lite_2048::config::Config;
use lite_2048::sim::{self, BatchReport};

#[derive(Debug, Parser)]
#[command(name = "simulate", about = "Play random 2x2 games in parallel and report how they end")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10_000)]
    games: u64,

    /// First seed; game i uses seed + i (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop a game after this many moves even if it is not stuck
    #[arg(long, default_value_t = 10_000)]
    max_moves: u32,

    /// Path to a TOML configuration file (rules and seed)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let first = args.seed.or(config.seed).unwrap_or(0);
    let last = first
        .checked_add(args.games)
        .context("seed range overflows u64")?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:40}] {pos}/{len} games")?
                .progress_chars("=> "),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let start = Instant::now();
    let summaries = sim::play_many_with(first..last, &config.rules, args.max_moves, |_| pb.inc(1));
    pb.finish_and_clear();
    let report = BatchReport::from_summaries(&summaries);
    info!("played {} games in {:.2}s", report.games, start.elapsed().as_secs_f64());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Games: {} | stuck: {} | mean moves: {:.1} | max moves: {} | best tile: {}",
            report.games,
            report.stuck,
            report.mean_moves,
            report.max_moves,
            report.best_tile()
        );
        for (tile, count) in &report.highest_tiles {
            println!("  {:>6}: {}", tile, count);
        }
    }
    Ok(())
}
