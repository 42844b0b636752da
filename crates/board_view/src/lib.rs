//! Board View: jeden snapshot betting boardu z raw feedu
//!
//! Skládá dohromady bet lookup, odds, suspension, last results a karty
//! aktuálního kola. Používá observer i offline `board-decode`.

use bet_lookup::{extract_bets, find_bet_with_type, is_actionable, is_suspended_strict, BetRecord};
use card_codec::{decode_card_field, DecodedCard};
use odds_normalizer::BetSide;
use result_history::{recent_entries, ResultHistoryEntry, RECENT_RESULTS_LIMIT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Raw payloads of one board as fetched from the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardFeed {
    #[serde(default)]
    pub game:    String,
    /// Odds endpoint payload, any shape `extract_bets` understands.
    #[serde(default)]
    pub odds:    Value,
    #[serde(default)]
    pub history: Value,
    #[serde(default)]
    pub current: Value,
}

impl BoardFeed {
    /// Feed from a live odds payload. An object payload also carries the
    /// current round (`card`, `data.res`); a bare array is only bets and must
    /// never be read as result history.
    pub fn from_odds_payload(game: impl Into<String>, odds: Value, history: Value) -> Self {
        let current = if odds.is_object() { odds.clone() } else { Value::Null };
        Self { game: game.into(), odds, history, current }
    }
}

/// What a single bet button needs to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub label:      String,
    pub nat:        Option<String>,
    pub sid:        Option<Value>,
    pub back:       String,
    pub lay:        String,
    pub suspended:  bool,
    pub actionable: bool,
}

impl SelectionView {
    fn resolve(label: &str, bet: Option<&BetRecord>) -> Self {
        let (back, lay) = match bet {
            Some(b) => (b.formatted_odds(BetSide::Back), b.formatted_odds(BetSide::Lay)),
            None => (odds_normalizer::NO_ODDS.to_string(), odds_normalizer::NO_ODDS.to_string()),
        };
        Self {
            label:      label.to_string(),
            nat:        bet.and_then(|b| b.nat.clone()),
            sid:        bet.and_then(|b| b.sid.clone()),
            back,
            lay,
            suspended:  is_suspended_strict(bet),
            actionable: is_actionable(bet, BetSide::Back) || is_actionable(bet, BetSide::Lay),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub game:         String,
    pub selections:   Vec<SelectionView>,
    pub last_results: Vec<ResultHistoryEntry>,
    pub cards:        Vec<DecodedCard>,
}

impl BoardSnapshot {
    /// Resolve `labels` against the feed. With no labels every bet record
    /// becomes a selection, in feed order.
    pub fn from_feed(feed: &BoardFeed, labels: &[String]) -> Self {
        let bets = extract_bets(&feed.odds);
        debug!(game = %feed.game, bets = bets.len(), "board feed parsed");

        let selections = if labels.is_empty() {
            bets.iter()
                .map(|b| SelectionView::resolve(b.label(), Some(b)))
                .collect()
        } else {
            labels
                .iter()
                .map(|l| SelectionView::resolve(l, find_bet_with_type(&bets, l)))
                .collect()
        };

        Self {
            game: feed.game.clone(),
            selections,
            last_results: recent_entries(&feed.history, &feed.current, RECENT_RESULTS_LIMIT),
            cards: current_cards(&feed.current),
        }
    }

    pub fn selection(&self, label: &str) -> Option<&SelectionView> {
        self.selections.iter().find(|s| s.label == label)
    }

    pub fn actionable_count(&self) -> usize {
        self.selections.iter().filter(|s| s.actionable).count()
    }
}

/// Cards of the current round sit either on the record itself or under `data`.
fn current_cards(current: &Value) -> Vec<DecodedCard> {
    let cards = decode_card_field(current);
    if !cards.is_empty() {
        return cards;
    }
    current.get("data").map(decode_card_field).unwrap_or_default()
}
