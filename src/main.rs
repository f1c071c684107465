use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use lite_2048::config::Config;
use lite_2048::game::{Game, GameStatus};
use lite_2048::input::{self, RawTerminal};
use lite_2048::render::TerminalView;
use lite_2048::session::{Flow, Session};

#[derive(Debug, Parser)]
#[command(name = "lite-2048", about = "Play 2048 on a 2x2 grid in the terminal")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed the tile RNG (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Plain tiles without the colour palette
    #[arg(long)]
    no_color: bool,

    /// Apply these directions (e.g. "up,left,down") and print the grid after each, no terminal UI
    #[arg(long, value_name = "MOVES")]
    script: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_color {
        config.display.color = false;
    }

    let game = match config.seed {
        Some(seed) => Game::seeded(seed, config.rules.clone()),
        None => Game::from_entropy(config.rules.clone()),
    };

    match &args.script {
        Some(script) => run_script(game, script),
        None => run_interactive(game, config.display.color),
    }
}

fn run_script(mut game: Game, script: &str) -> anyhow::Result<()> {
    let moves = input::parse_script(script)?;
    println!("{}", game.grid());
    for dir in moves {
        let outcome = game.apply(dir);
        let note = if outcome.moved { "" } else { " (no change)" };
        println!("{dir}{note}\n{}", outcome.grid);
        if outcome.status == GameStatus::Stuck {
            println!("stuck after {} moves", game.moves());
            break;
        }
    }
    Ok(())
}

fn run_interactive(game: Game, color: bool) -> anyhow::Result<()> {
    let _terminal = RawTerminal::enter(io::stdout()).context("failed to set up terminal")?;
    let mut session = Session::new(game, TerminalView::new(io::stdout(), color));
    session.start()?;
    loop {
        let Some(command) = input::read_command()? else {
            continue;
        };
        if session.handle(command)? == Flow::Quit {
            break;
        }
    }
    info!("quit after {} moves", session.game().moves());
    Ok(())
}
