use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use bot_2048::autoplay::{AutoPlayer, StopHandle};
use bot_2048::config::BotConfig;
use bot_2048::engine as GameEngine;
use bot_2048::expectimax::{Bot, Strategy};
use bot_2048::game::{Frame, Game, Renderer};
use bot_2048::store::{FileStore, MemoryStore, ScoreStore};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Parser)]
#[command(name = "bot-2048", version, about = "Watch a search bot play 2048 in the terminal")]
struct Args {
    /// Move-selection strategy (overrides the config file)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Base search depth in plies
    #[arg(long)]
    depth: Option<u32>,

    /// Milliseconds between moves
    #[arg(long)]
    speed: Option<u64>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for tile spawns and the random strategy
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many moves
    #[arg(long)]
    max_moves: Option<u64>,

    /// Keep the best score in this file between runs
    #[arg(long)]
    best_file: Option<PathBuf>,

    /// Only print the final summary
    #[arg(long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn apply(&self, cfg: &mut BotConfig) {
        if let Some(strategy) = self.strategy { cfg.strategy = strategy; }
        if let Some(depth) = self.depth { cfg.search.max_depth = depth; }
        if let Some(speed) = self.speed { cfg.tick_ms = speed; }
        if let Some(seed) = self.seed { cfg.seed = Some(seed); }
    }
}

struct TerminalRenderer<W: Write> {
    out: W,
    quiet: bool,
    stop: StopHandle,
    failed: bool,
}

impl<W: Write> TerminalRenderer<W> {
    fn new(out: W, quiet: bool, stop: StopHandle) -> Self { Self { out, quiet, stop, failed: false } }

    fn draw(&mut self, frame: &Frame) -> std::io::Result<()> {
        let gained = if frame.gained > 0 { format!(" (+{})", frame.gained) } else { String::new() };
        writeln!(self.out, "{}", frame.board)?;
        writeln!(self.out, "score: {}{gained} | best: {} | {}\n", frame.score, frame.best_score, frame.state)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, frame: &Frame) {
        if self.quiet || self.failed {
            return;
        }
        // A closed stdout (e.g. piped into `head`) ends the run.
        if let Err(e) = self.draw(frame) {
            log::warn!("could not write to the terminal, stopping: {e}");
            self.failed = true;
            self.stop.stop();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level))
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();

    let mut cfg = match &args.config {
        Some(path) => BotConfig::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => BotConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;

    GameEngine::new();
    let seed = cfg.seed.unwrap_or_else(rand::random);
    log::info!(
        "strategy {} | depth {} | tick {} ms | seed {seed}",
        cfg.strategy,
        cfg.search.max_depth,
        cfg.tick_ms
    );

    let store: Box<dyn ScoreStore + Send> = match &args.best_file {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let bot = Bot::with_seed(cfg.strategy, cfg.search.clone(), cfg.weights, seed);
    let mut player = AutoPlayer::new(bot).with_interval(cfg.tick());
    let renderer = TerminalRenderer::new(std::io::stdout(), args.quiet, player.stop_handle());
    let mut game = Game::new(StdRng::seed_from_u64(seed), renderer, store);

    let start = Instant::now();
    game.start();
    let report = player.run(&mut game, args.max_moves);
    let elapsed = start.elapsed().as_secs_f64().max(1e-6);

    let stats = player.bot().last_stats();
    println!(
        "Moves: {} | moves/sec: {:.1} | score: {} | best: {} | highest tile: {} | \
         cache hit rate: {:.1}% | stopped: {:?}",
        report.moves,
        report.moves as f64 / elapsed,
        game.score(),
        game.best_score(),
        game.board().highest_tile(),
        stats.cache_hit_rate() * 100.0,
        report.reason
    );
    if report.overruns > 0 {
        println!("{} moves took longer than the {} ms tick", report.overruns, cfg.tick_ms);
    }
    Ok(())
}
