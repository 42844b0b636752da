/// Board Live: Logger
/// JSONL event stream, jeden soubor na den

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Today's file, `<log_dir>/<YYYY-MM-DD>.jsonl`.
    pub fn current_path(&self) -> PathBuf {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.log_dir.join(format!("{date}.jsonl"))
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let path  = self.current_path();
        let line  = serde_json::to_string(event).context("serialize event")?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct BoardSnapshotEvent {
    pub ts:           String,
    pub event:        &'static str,   // "BOARD_SNAPSHOT"
    pub game:         String,
    pub selections:   usize,
    pub actionable:   usize,
    pub last_winner:  Option<String>,
    pub last_round:   Option<String>,
    pub cards:        Vec<String>,    // "K♥", "10♠"
}

#[derive(Serialize, Debug)]
pub struct BetSlipEvent {
    pub ts:           String,
    pub event:        &'static str,   // "BET_SLIP"
    pub game:         String,
    pub slip:         Value,          // { sid, nat, odds, amount, side? }
    pub action:       String,         // "OBSERVE"
}

#[derive(Serialize, Debug)]
pub struct FeedErrorEvent {
    pub ts:           String,
    pub event:        &'static str,   // "FEED_ERROR"
    pub game:         String,
    pub url:          String,
    pub error:        String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_event() {
        let dir = std::env::temp_dir().join(format!("board_logger_test_{}", std::process::id()));
        let logger = EventLogger::new(&dir);

        for game in ["dt20", "teen20"] {
            logger
                .log(&FeedErrorEvent {
                    ts:    now_iso(),
                    event: "FEED_ERROR",
                    game:  game.to_string(),
                    url:   "http://localhost/odds".to_string(),
                    error: "timeout".to_string(),
                })
                .unwrap();
        }

        let body = fs::read_to_string(logger.current_path()).unwrap();
        let lines: Vec<Value> = body.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["game"], "teen20");
        assert_eq!(lines[0]["event"], "FEED_ERROR");

        fs::remove_dir_all(&dir).ok();
    }
}
