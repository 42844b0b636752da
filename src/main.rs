/// Board Live: Observer
///
/// Co dělá:
///   1. Každých N sekund stáhne odds + last results jednoho boardu
///   2. Dekóduje karty, normalizuje odds, dohledá tlačítka podle labelů
///   3. Loguje snapshot (tracing + JSONL v ./logs/)
///   4. Volitelně sestaví probe bet slipy pro otevřené selekce
///
/// Co NEDĚLÁ: žádné sázky (observe only, slipy se jen zapisují do logu)
///
/// Spuštění:
///   BOARD_FEED_URL=http://127.0.0.1:3000/odds/dt20 cargo run --bin board-observer

use anyhow::Result;
use bet_lookup::{extract_bets, find_bet_with_type, is_actionable, place_bet, BetSlip, PlaceBet};
use board_view::{BoardFeed, BoardSnapshot};
use dotenv::dotenv;
use logger::{now_iso, BetSlipEvent, BoardSnapshotEvent, EventLogger, FeedErrorEvent};
use std::env;
use std::fs::File;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod feed_client;

use config::ObserverConfig;
use feed_client::FeedClient;

/// Records slips instead of sending them anywhere.
struct ObservePlacer<'a> {
    logger: &'a EventLogger,
    game:   &'a str,
}

impl PlaceBet for ObservePlacer<'_> {
    fn place_bet(&self, slip: &BetSlip) -> Result<()> {
        self.logger.log(&BetSlipEvent {
            ts:     now_iso(),
            event:  "BET_SLIP",
            game:   self.game.to_string(),
            slip:   serde_json::to_value(slip)?,
            action: "OBSERVE".to_string(),
        })
    }
}

fn snapshot_event(snap: &BoardSnapshot) -> BoardSnapshotEvent {
    let last = snap.last_results.first();
    BoardSnapshotEvent {
        ts:          now_iso(),
        event:       "BOARD_SNAPSHOT",
        game:        snap.game.clone(),
        selections:  snap.selections.len(),
        actionable:  snap.actionable_count(),
        last_winner: last.and_then(|r| r.winner.clone()),
        last_round:  last.and_then(|r| r.round_id.clone()),
        cards:       snap.cards.iter().map(|c| c.to_string()).collect(),
    }
}

/// Observe-only slips for every actionable selection of the board.
fn probe_slips(cfg: &ObserverConfig, feed: &BoardFeed, placer: &ObservePlacer<'_>, stake: f64) -> usize {
    let bets = extract_bets(&feed.odds);
    let targets: Vec<_> = if cfg.labels.is_empty() {
        bets.iter().collect()
    } else {
        cfg.labels.iter().filter_map(|l| find_bet_with_type(&bets, l)).collect()
    };

    let mut sent = 0usize;
    for bet in targets {
        if !is_actionable(Some(bet), cfg.probe_side) {
            continue;
        }
        match place_bet(placer, Some(bet), Some(cfg.probe_side), stake) {
            Ok(_) => sent += 1,
            Err(e) => warn!("probe slip for {:?} failed: {}", bet.label(), e),
        }
    }
    sent
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cfg = ObserverConfig::from_env()?;

    info!("=== Board Live Observer ===");
    info!("Mode: OBSERVE ONLY (no bets)");
    info!("Game: {} | feed: {}", cfg.game, cfg.feed_url);
    info!("Logs: ./{}/", cfg.log_dir);

    // Single instance lock per game
    let lock_file_path = env::temp_dir().join(format!("board_live_{}.lock", cfg.game));
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another board-observer for {} is already running! Exiting.", cfg.game);
            return Ok(());
        }
    };

    let logger = EventLogger::new(&cfg.log_dir);
    let client = FeedClient::new(&cfg)?;
    let placer = ObservePlacer { logger: &logger, game: &cfg.game };

    info!("Poll interval: {}s", cfg.poll_interval_secs);

    loop {
        match client.fetch_board().await {
            Ok(feed) => {
                let snap = BoardSnapshot::from_feed(&feed, &cfg.labels);
                let ev = snapshot_event(&snap);

                info!(
                    selections = ev.selections,
                    actionable = ev.actionable,
                    cards = ev.cards.join(" "),
                    "{} snapshot, last winner {:?}",
                    snap.game, ev.last_winner
                );
                for s in &snap.selections {
                    tracing::debug!("  {:<24} back={} lay={} suspended={}", s.label, s.back, s.lay, s.suspended);
                }

                if let Err(e) = logger.log(&ev) {
                    warn!("snapshot log failed: {}", e);
                }

                if let Some(stake) = cfg.probe_stake {
                    let sent = probe_slips(&cfg, &feed, &placer, stake);
                    info!("{} probe slips recorded", sent);
                }
            }
            Err(e) => {
                warn!("{} poll failed: {:#}", cfg.game, e);
                let _ = logger.log(&FeedErrorEvent {
                    ts:    now_iso(),
                    event: "FEED_ERROR",
                    game:  cfg.game.clone(),
                    url:   client.feed_url().to_string(),
                    error: format!("{e:#}"),
                });
            }
        }

        sleep(Duration::from_secs(cfg.poll_interval_secs)).await;
    }
}
