//! Observer config z env proměnných (+ `.env` přes dotenv)

use anyhow::{bail, Result};
use odds_normalizer::BetSide;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverConfig {
    /// Odds endpoint; its payload doubles as the current result.
    pub feed_url:           String,
    /// Last-results endpoint. Without it history comes from the odds payload.
    pub results_url:        Option<String>,
    pub game:               String,
    /// Button labels to resolve; empty means every bet in the feed.
    pub labels:             Vec<String>,
    pub poll_interval_secs: u64,
    pub log_dir:            String,
    /// Stake for observe-only bet slips. `None` = no slips at all.
    pub probe_stake:        Option<f64>,
    pub probe_side:         BetSide,
}

impl ObserverConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let Some(feed_url) = get("BOARD_FEED_URL") else {
            bail!("BOARD_FEED_URL is not set");
        };

        let labels = get("BOARD_LABELS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let poll_interval_secs = get("BOARD_POLL_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let probe_stake = get("BOARD_PROBE_STAKE")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0);

        let probe_side = match get("BOARD_PROBE_SIDE") {
            Some(raw) => raw.parse::<BetSide>().map_err(anyhow::Error::msg)?,
            None => BetSide::Back,
        };

        Ok(Self {
            feed_url,
            results_url: get("BOARD_RESULTS_URL"),
            game: get("BOARD_GAME").unwrap_or_else(|| "board".to_string()),
            labels,
            poll_interval_secs,
            log_dir: get("BOARD_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            probe_stake,
            probe_side,
        })
    }
}
