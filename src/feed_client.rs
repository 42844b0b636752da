//! HTTP fetch board payloadů z backendu
//!
//! Jeden request na endpoint a poll cyklus, žádné retry. Při chybě vrací Err
//! a observer to jen zaloguje.

use anyhow::{bail, Context, Result};
use board_view::BoardFeed;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ObserverConfig;

/// Prefix of `s` at most `max` bytes long, cut on a char boundary.
fn clip(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
    &s[..end]
}

pub struct FeedClient {
    client:      reqwest::Client,
    feed_url:    String,
    results_url: Option<String>,
    game:        String,
}

impl FeedClient {
    pub fn new(cfg: &ObserverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("BoardLive/1.0")
            .build()
            .context("failed to create reqwest client")?;

        Ok(Self {
            client,
            feed_url:    cfg.feed_url.clone(),
            results_url: cfg.results_url.clone(),
            game:        cfg.game.clone(),
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let resp = self.client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{url} returned {status}: {}", clip(&body, 200));
        }

        let raw = resp.text().await.context("body read failed")?;
        debug!("{} raw (first 300): {}", url, clip(&raw, 300));
        serde_json::from_str(&raw).with_context(|| format!("{url}: JSON parse failed"))
    }

    /// Odds payload plus, if configured, the last-results payload.
    pub async fn fetch_board(&self) -> Result<BoardFeed> {
        let (odds, history) = match &self.results_url {
            Some(results_url) => {
                let (odds, history) = tokio::join!(
                    self.fetch_json(&self.feed_url),
                    self.fetch_json(results_url),
                );
                (odds?, history?)
            }
            None => (self.fetch_json(&self.feed_url).await?, Value::Null),
        };

        Ok(BoardFeed::from_odds_payload(self.game.clone(), odds, history))
    }
}
