use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pitbot::agent::{Agent, SearchKind};
use pitbot::engine::UciEngine;
use pitbot::eval::Heuristic;
use pitbot::game::{run_match, CancelToken, DisplayOpts, MatchSettings, Seat, Side};
use pitbot::tablebase::LichessTablebase;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pit chess agents against each other or a UCI engine", long_about = None)]
struct Args {
    /// White player: random, improved-random, greedy:<h>, minimax:<h>:<depth>,
    /// alphabeta:<h>:<depth>, or engine (h is naive|improved|advanced)
    #[arg(long, default_value = "alphabeta:advanced:2")]
    white: String,

    /// Black player, same format as --white
    #[arg(long, default_value = "random")]
    black: String,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,

    /// Path to a UCI engine binary, required when a seat is `engine`
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Engine thinking time per move in milliseconds
    #[arg(long, default_value_t = 100)]
    movetime_ms: u64,

    /// Seed the agents' random number generators for replayable games
    #[arg(long)]
    seed: Option<u64>,

    /// Print the board after every move
    #[arg(long)]
    display: bool,

    /// Pause between displayed moves in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Write per-game summaries as JSON to this path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip online tablebase probes in the improved and advanced evaluators
    #[arg(long)]
    no_tablebase: bool,
}

fn parse_heuristic(s: &str) -> Result<Heuristic> {
    Heuristic::from_str(s).map_err(anyhow::Error::msg)
}

fn parse_depth(s: &str) -> Result<u32> {
    let depth: u32 = s.parse().with_context(|| format!("invalid search depth {s:?}"))?;
    if depth == 0 {
        bail!("search depth must be at least 1");
    }
    Ok(depth)
}

fn build_agent(selector: &str) -> Result<Agent> {
    let parts: Vec<&str> = selector.split(':').collect();
    let agent = match parts.as_slice() {
        ["random"] => Agent::random(),
        ["improved-random"] => Agent::capture_random(),
        ["greedy", h] => Agent::greedy(parse_heuristic(h)?),
        ["minimax", h, d] => {
            Agent::searching(parse_heuristic(h)?, SearchKind::Minimax, parse_depth(d)?)
        }
        ["alphabeta", h, d] => {
            Agent::searching(parse_heuristic(h)?, SearchKind::AlphaBeta, parse_depth(d)?)
        }
        _ => bail!(
            "unknown agent {selector:?} (expected random, improved-random, greedy:<h>, \
             minimax:<h>:<depth>, alphabeta:<h>:<depth>, or engine)"
        ),
    };
    Ok(agent)
}

fn build_seat(selector: &str, args: &Args, seed: Option<u64>) -> Result<Seat> {
    if selector == "engine" {
        let path = args
            .engine_path
            .as_ref()
            .context("--engine-path is required when a seat is `engine`")?;
        let program = path.to_str().context("engine path is not valid UTF-8")?;
        let engine = UciEngine::launch(program, &[])?;
        return Ok(Seat::Engine {
            engine,
            movetime: Duration::from_millis(args.movetime_ms),
        });
    }
    let mut agent = build_agent(selector)?;
    if let Some(seed) = seed {
        agent = agent.with_seed(seed);
    }
    if !args.no_tablebase {
        agent = agent.with_probe(Arc::new(LichessTablebase::default()));
    }
    Ok(Seat::Agent(agent))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut white = build_seat(&args.white, &args, args.seed)?;
    let mut black = build_seat(&args.black, &args, args.seed.map(|s| s.wrapping_add(1)))?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel())?;
    }

    let settings = MatchSettings {
        rounds: args.games,
        start_fen: args.fen.clone(),
        display: DisplayOpts {
            show_board: args.display,
            pause: args.pause_ms.map(Duration::from_millis),
        },
    };

    println!("{} (White) vs {} (Black), {} game(s)", white.name(), black.name(), args.games);
    let summaries = run_match(&mut white, &mut black, &settings, &cancel)?;

    let mut white_wins = 0u32;
    let mut black_wins = 0u32;
    let mut draws = 0u32;
    for summary in &summaries {
        println!("game {}/{}: {}", summary.round, summary.rounds_total, summary.message);
        match summary.outcome.winner() {
            Some(Side::White) => white_wins += 1,
            Some(Side::Black) => black_wins += 1,
            None if summary.outcome.is_draw() => draws += 1,
            None => {}
        }
    }
    println!(
        "score: {} {white_wins} - {black_wins} {} ({draws} draw(s))",
        white.name(),
        black.name(),
    );

    if let Some(path) = &args.out {
        let json = serde_json::to_string_pretty(&summaries)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("summaries written to {}", path.display());
    }

    for seat in [white, black] {
        if let Seat::Engine { engine, .. } = seat {
            engine.quit()?;
        }
    }
    Ok(())
}
