//! Export binary checkpoint to SQLite database.
//!
//! Usage: export_sqlite [INPUT] [OUTPUT]  (defaults: data/table.bin, data/table.db)
//!
//! Converts the transposition table checkpoint to a SQLite table for ad-hoc
//! queries over recorded states.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{debug, info};
use rusqlite::{params, Connection};
use samegame_solver::checkpoint::Checkpoint;

#[derive(Parser, Debug)]
#[command(name = "export_sqlite", about = "Export a table checkpoint to SQLite")]
struct Args {
    /// Binary checkpoint to read
    #[arg(default_value = "data/table.bin")]
    input: PathBuf,

    /// SQLite database to create (replaced if present)
    #[arg(default_value = "data/table.db")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let input_path = args.input;
    let output_path = args.output;

    println!("Checkpoint to SQLite Exporter");
    println!("=============================");
    println!("Input:  {:?}", input_path);
    println!("Output: {:?}", output_path);
    println!();

    println!("Loading binary checkpoint...");
    let start = Instant::now();
    let checkpoint = Checkpoint::load(&input_path)
        .with_context(|| format!("Failed to load checkpoint {:?}", input_path))?;
    println!(
        "Loaded {} states in {:.2}s",
        checkpoint.entries.len(),
        start.elapsed().as_secs_f64()
    );

    // Remove existing output file if present
    if output_path.exists() {
        info!("Replacing existing {:?}", output_path);
        std::fs::remove_file(&output_path)
            .with_context(|| format!("Failed to remove {:?}", output_path))?;
    }

    println!("\nCreating SQLite database...");
    let start = Instant::now();
    let conn = Connection::open(&output_path)
        .with_context(|| format!("Failed to create database {:?}", output_path))?;

    conn.execute(
        "CREATE TABLE states (
            hash INTEGER PRIMARY KEY,
            score REAL NOT NULL,
            value REAL NOT NULL,
            visits INTEGER NOT NULL
        )",
        [],
    )
    .context("Failed to create table")?;
    conn.execute(
        "CREATE TABLE meta (key TEXT PRIMARY KEY, value INTEGER NOT NULL)",
        [],
    )
    .context("Failed to create meta table")?;
    // Stored as i64 bit patterns, like the hashes.
    conn.execute(
        "INSERT INTO meta (key, value) VALUES ('key_seed', ?1)",
        params![checkpoint.seed as i64],
    )?;

    println!("Inserting {} states...", checkpoint.entries.len());

    let batch_size = 100_000;
    let total = checkpoint.entries.len();
    let mut inserted = 0;

    // Use a transaction for much faster inserts
    let tx = conn.unchecked_transaction().context("Failed to start transaction")?;
    {
        let mut stmt = tx
            .prepare("INSERT INTO states (hash, score, value, visits) VALUES (?1, ?2, ?3, ?4)")
            .context("Failed to prepare statement")?;

        for (i, (hash, entry)) in checkpoint.entries.iter().enumerate() {
            stmt.execute(params![*hash as i64, entry.score, entry.value, entry.visits])
                .with_context(|| format!("Failed to insert state {:016x}", hash))?;
            inserted += 1;

            if (i + 1) % batch_size == 0 {
                let pct = 100.0 * inserted as f64 / total as f64;
                let rate = inserted as f64 / start.elapsed().as_secs_f64();
                println!("  {:>3.0}% ({}/{}) - {:.0} rows/sec", pct, inserted, total, rate);
            }
        }
    }
    tx.commit().context("Failed to commit transaction")?;

    let insert_time = start.elapsed().as_secs_f64();
    println!(
        "Inserted {} states in {:.2}s ({:.0} rows/sec)",
        inserted,
        insert_time,
        inserted as f64 / insert_time.max(f64::EPSILON)
    );

    println!("\nVerifying database...");
    let step = (total / 5).max(1);
    for (hash, expected) in checkpoint.entries.iter().step_by(step).take(5) {
        let (score, visits): (f64, u32) = conn
            .query_row(
                "SELECT score, visits FROM states WHERE hash = ?1",
                params![*hash as i64],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .with_context(|| format!("Failed to query state {:016x}", hash))?;
        debug!("state {:016x}: score={} visits={}", hash, score, visits);
        ensure!(
            score == expected.score && visits == expected.visits,
            "Mismatch for state {:016x}",
            hash
        );
    }
    println!("Verification passed!");

    let input_size = std::fs::metadata(&input_path).map(|m| m.len()).unwrap_or(0);
    let output_size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);

    println!("\nFile sizes:");
    println!("  Binary: {:.1} MB", input_size as f64 / 1024.0 / 1024.0);
    println!("  SQLite: {:.1} MB", output_size as f64 / 1024.0 / 1024.0);

    println!("\nDone! Database created at {:?}", output_path);
    Ok(())
}
