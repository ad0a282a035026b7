use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use bot_2048::autoplay::{AutoPlayer, StopReason};
use bot_2048::config::BotConfig;
use bot_2048::engine as GameEngine;
use bot_2048::expectimax::{Bot, Strategy};
use bot_2048::game::{Game, NullRenderer, WIN_TILE};
use bot_2048::store::MemoryStore;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "selfplay", about = "Play many headless 2048 games in parallel and report statistics")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: u64,

    /// Move-selection strategy (overrides the config file)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Base search depth in plies
    #[arg(long)]
    depth: Option<u32>,

    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    /// Per-game: stop after this many moves
    #[arg(long)]
    max_moves: Option<u64>,

    /// TOML config file for search settings and weights
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy)]
struct GameResult {
    score: u64,
    highest_tile: u32,
    moves: u64,
    capped: bool,
}

fn play_one(cfg: &BotConfig, seed: u64, max_moves: Option<u64>) -> GameResult {
    let mut game = Game::new(StdRng::seed_from_u64(seed), NullRenderer, MemoryStore::new());
    let bot = Bot::with_seed(cfg.strategy, cfg.search.clone(), cfg.weights, seed);
    let mut player = AutoPlayer::new(bot).with_interval(Duration::ZERO);
    game.start();
    let report = player.run(&mut game, max_moves);
    GameResult {
        score: game.score(),
        highest_tile: game.board().highest_tile(),
        moves: report.moves,
        capped: report.reason == StopReason::MoveLimit,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut cfg = match &args.config {
        Some(path) => BotConfig::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => BotConfig::default(),
    };
    if let Some(strategy) = args.strategy { cfg.strategy = strategy; }
    if let Some(depth) = args.depth { cfg.search.max_depth = depth; }
    cfg.validate()?;
    if args.games == 0 {
        anyhow::bail!("--games must be at least 1");
    }

    GameEngine::new();
    let base_seed = args.seed.or(cfg.seed).unwrap_or_else(rand::random);
    eprintln!(
        "Playing {} games | strategy: {} | depth: {} | seed: {}",
        args.games, cfg.strategy, cfg.search.max_depth, base_seed
    );

    let pb = if args.quiet { ProgressBar::hidden() } else { ProgressBar::new(args.games) };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})",
        )?
        .progress_chars("=>-"),
    );
    let start = Instant::now();
    let results: Vec<GameResult> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let r = play_one(&cfg, base_seed.wrapping_add(i), args.max_moves);
            pb.inc(1);
            r
        })
        .collect();
    pb.finish_and_clear();
    let elapsed = start.elapsed().as_secs_f64().max(1e-6);

    let n = results.len() as f64;
    let mean_score = results.iter().map(|r| r.score as f64).sum::<f64>() / n;
    let max_score = results.iter().map(|r| r.score).max().unwrap_or(0);
    let total_moves: u64 = results.iter().map(|r| r.moves).sum();
    let wins = results.iter().filter(|r| r.highest_tile >= WIN_TILE).count();
    let capped = results.iter().filter(|r| r.capped).count();
    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for r in &results {
        *histogram.entry(r.highest_tile).or_default() += 1;
    }

    println!("games: {} | elapsed: {:.1}s | moves/sec: {:.1}", results.len(), elapsed, total_moves as f64 / elapsed);
    println!("mean score: {:.1} | max score: {}", mean_score, max_score);
    println!("win rate ({}+): {:.1}%", WIN_TILE, wins as f64 * 100.0 / n);
    if capped > 0 {
        println!("{} games hit the move limit", capped);
    }
    println!("highest tile:");
    for (tile, count) in histogram.iter().rev() {
        println!("  {:>6}: {:>5} ({:.1}%)", tile, count, *count as f64 * 100.0 / n);
    }
    Ok(())
}
