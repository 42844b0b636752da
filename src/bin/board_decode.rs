//! board-decode: offline dekódování uloženého board feedu
//!
//! Vstup: JSON `{ "game", "odds", "history", "current" }` ze souboru nebo stdin.
//! Výstup: snapshot boardu jako JSON na stdout.
//!
//! Spuštění:
//!   cargo run --bin board-decode -- dump.json "Dragon" "Tiger" "Tie"
//!   cat dump.json | cargo run --bin board-decode -- - "Dragon"

use anyhow::{Context, Result};
use board_view::{BoardFeed, BoardSnapshot};
use std::io::Read;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("read {path}"))
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "-".to_string());
    let labels: Vec<String> = args.collect();

    let raw = read_input(&path)?;
    let feed: BoardFeed = serde_json::from_str(&raw).context("feed JSON parse failed")?;

    let snap = BoardSnapshot::from_feed(&feed, &labels);
    info!(
        "{}: {} selections, {} actionable, {} results, {} cards",
        snap.game,
        snap.selections.len(),
        snap.actionable_count(),
        snap.last_results.len(),
        snap.cards.len()
    );

    println!("{}", serde_json::to_string_pretty(&snap)?);
    Ok(())
}
