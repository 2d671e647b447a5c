//! SameGame Policy Runner
//!
//! Plays every selected policy on every board file and reports the scores.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use samegame_core::{Board, PolicyKind, Scoring, TranspositionTable, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use samegame_solver::checkpoint::Checkpoint;
use samegame_solver::runner::Runner;
use samegame_solver::stats::BatchStats;

#[derive(Parser, Debug)]
#[command(name = "solver", about = "Run SameGame policies over board files")]
struct Args {
    /// Board files, one grid of color codes each
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Policy to run (repeatable): random, greedy, low-color
    #[arg(short, long = "policy")]
    policies: Vec<PolicyKind>,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Added to every code read from a file (1 reads -1 as empty)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    color_offset: i64,

    /// Scoring rule: samegame, popstar, linear
    #[arg(long, default_value = "samegame")]
    scoring: Scoring,

    /// Seed for the random policy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the board before every move
    #[arg(long)]
    viewer: bool,

    /// Record every game into the transposition table
    #[arg(long)]
    record: bool,

    /// Transposition table checkpoint, loaded before and saved after the run
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// Settings for one batch, resolved from the command line.
#[derive(Debug, Clone)]
struct RunConfig {
    files: Vec<PathBuf>,
    policies: Vec<PolicyKind>,
    width: usize,
    height: usize,
    color_offset: i64,
    scoring: Scoring,
    seed: u64,
    viewer: bool,
    record: bool,
    checkpoint: Option<PathBuf>,
}

impl TryFrom<Args> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.width == 0 || args.height == 0 {
            bail!("board dimensions must be non-zero, got {}x{}", args.width, args.height);
        }
        let mut policies: Vec<PolicyKind> = Vec::new();
        for kind in args.policies {
            if !policies.contains(&kind) {
                policies.push(kind);
            }
        }
        if policies.is_empty() {
            policies = vec![PolicyKind::Random, PolicyKind::Greedy];
        }
        Ok(RunConfig {
            files: args.files,
            policies,
            width: args.width,
            height: args.height,
            color_offset: args.color_offset,
            scoring: args.scoring,
            seed: args.seed,
            viewer: args.viewer,
            // A checkpoint implies recording.
            record: args.record || args.checkpoint.is_some(),
            checkpoint: args.checkpoint,
        })
    }
}

fn load_board(config: &RunConfig, path: &Path) -> Result<Board> {
    let file = File::open(path).with_context(|| format!("Failed to open input file {:?}", path))?;
    let mut board = Board::with_scoring(config.width, config.height, config.scoring);
    board
        .load_with_offset(BufReader::new(file), config.color_offset)
        .with_context(|| format!("Failed to load board from {:?}", path))?;
    Ok(board)
}

fn run(config: RunConfig) -> Result<()> {
    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, finishing current game...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let table = TranspositionTable::global();
    if let Some(path) = config.checkpoint.as_ref().filter(|p| p.exists()) {
        let start = Instant::now();
        let checkpoint = Checkpoint::load(path)
            .with_context(|| format!("Failed to load checkpoint {:?}", path))?;
        let count = checkpoint.restore(&table)?;
        info!(
            "Loaded {} states from {:?} in {:.2}s",
            count,
            path,
            start.elapsed().as_secs_f64()
        );
    }

    let runner = Runner {
        table: config.record.then(|| table.clone()),
        viewer: config.viewer,
    };
    let mut stats = BatchStats::new();

    'files: for (n, path) in config.files.iter().enumerate() {
        let label = path.display().to_string();
        stats.begin_board(&label);
        for &kind in &config.policies {
            if !running.load(Ordering::SeqCst) {
                warn!("Interrupted, skipping remaining games");
                break 'files;
            }

            let mut board = load_board(&config, path)?;
            let mut policy = kind.build(config.seed.wrapping_add(n as u64));
            let outcome = runner
                .play(&mut board, policy.as_mut())
                .with_context(|| format!("{} failed on {:?}", kind.name(), path))?;
            info!(
                "{} {}: score={} moves={} remaining={}",
                label,
                kind.name(),
                outcome.score,
                outcome.moves,
                outcome.remaining
            );
            stats.record(kind.name(), &outcome);
        }
    }

    println!();
    stats.print_summary();

    if let Some(path) = &config.checkpoint {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let start = Instant::now();
        let count = Checkpoint::save(path, &table)
            .with_context(|| format!("Failed to save checkpoint {:?}", path))?;
        println!(
            "Saved {} states to {:?} in {:.2}s",
            count,
            path,
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = RunConfig::try_from(args)?;
    info!(
        "{} file(s), policies {:?}, {}x{}, scoring {}",
        config.files.len(),
        config.policies.iter().map(|k| k.name()).collect::<Vec<_>>(),
        config.width,
        config.height,
        config.scoring.name()
    );
    run(config)
}
