//! Bet Lookup: hledání sázky podle labelu + suspension + bet slip
//!
//! Feed posílá ploché pole bet recordů (`nat`, `sid`, odds pod několika
//! legacy jmény, `gstatus`). UI hledá záznam podle textu tlačítka, který se
//! od upstream názvu občas liší ("Dragon Card A" vs "Card A").

use anyhow::Result;
use odds_normalizer::{format_odds, get_odds, has_odds, BetSide, OddsSource};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

pub const SUSPENDED_GSTATUS: &str = "SUSPENDED";
pub const SUSPENDED_STATUS: &str = "suspended";

/// Paths a bet array has been seen under, first non-empty wins.
const BET_ARRAY_PATHS: &[&str] = &["/data/sub", "/sub", "/data/t2", "/t2", "/data/data/sub", "/bets"];

// ── BetRecord ────────────────────────────────────────────────────────────────

/// One selection of a board as sent by the backend.
///
/// Odds fields (`back`, `b`, `b1`, `odds`, `l`, `lay`) and anything else the
/// feed adds stay in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub nat:      Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub bet_type: Option<String>,
    #[serde(default)]
    pub sid:      Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gstatus:  Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status:   Option<String>,
    #[serde(flatten)]
    pub extra:    Map<String, Value>,
}

impl BetRecord {
    pub fn label(&self) -> &str {
        self.nat.as_deref().unwrap_or("")
    }

    pub fn odds(&self, side: BetSide) -> Value {
        get_odds(self, side)
    }

    pub fn formatted_odds(&self, side: BetSide) -> String {
        format_odds(&self.odds(side))
    }
}

impl OddsSource for BetRecord {
    fn odds_field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// Strings arrive as numbers often enough (`"gstatus": 0`).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Pull the bet array out of whatever shape the endpoint returned.
pub fn extract_bets(payload: &Value) -> Vec<BetRecord> {
    let array = match payload {
        Value::Array(items) if !items.is_empty() => Some(items),
        _ => BET_ARRAY_PATHS.iter().find_map(|path| {
            payload
                .pointer(path)
                .and_then(Value::as_array)
                .filter(|items| !items.is_empty())
        }),
    };

    let Some(items) = array else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match BetRecord::deserialize(item) {
            Ok(bet) => Some(bet),
            Err(e) => {
                debug!("bet_lookup: skipping malformed bet record: {}", e);
                None
            }
        })
        .collect()
}

// ── Lookup ───────────────────────────────────────────────────────────────────

/// Case-insensitive, whitespace-tolerant form of a label.
pub fn normalize_label(label: &str) -> String {
    label
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_by<'a>(bets: &'a [BetRecord], label: &str, with_type: bool) -> Option<&'a BetRecord> {
    let wanted = normalize_label(label);
    if wanted.is_empty() {
        return None;
    }

    let names = |bet: &BetRecord| -> Vec<String> {
        let mut names = vec![normalize_label(bet.label())];
        if with_type {
            if let Some(t) = &bet.bet_type {
                names.push(normalize_label(t));
            }
        }
        names.retain(|n| !n.is_empty());
        names
    };

    // 1) exact
    if let Some(bet) = bets.iter().find(|&b| names(b).iter().any(|n| *n == wanted)) {
        return Some(bet);
    }

    // 2) substring oběma směry
    bets.iter().find(|&b| {
        names(b)
            .iter()
            .any(|n| wanted.contains(n.as_str()) || n.contains(wanted.as_str()))
    })
}

/// Find a bet by its `nat` label: exact match first, substring fallback second.
pub fn find_bet<'a>(bets: &'a [BetRecord], label: &str) -> Option<&'a BetRecord> {
    find_by(bets, label, false)
}

/// Like [`find_bet`] but `type` counts as a second name of the record.
pub fn find_bet_with_type<'a>(bets: &'a [BetRecord], label: &str) -> Option<&'a BetRecord> {
    find_by(bets, label, true)
}

// ── Suspension ───────────────────────────────────────────────────────────────

/// A missing record is suspended. Otherwise only `gstatus` decides;
/// a record without `gstatus` is open.
pub fn is_suspended(bet: Option<&BetRecord>) -> bool {
    match bet {
        None => true,
        Some(b) => b
            .gstatus
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(SUSPENDED_GSTATUS)),
    }
}

/// [`is_suspended`] plus the `status: "suspended"` flag some boards use.
pub fn is_suspended_strict(bet: Option<&BetRecord>) -> bool {
    is_suspended(bet)
        || bet
            .and_then(|b| b.status.as_deref())
            .is_some_and(|s| s.eq_ignore_ascii_case(SUSPENDED_STATUS))
}

/// Open for staking: not suspended and priced on the requested side.
pub fn is_actionable(bet: Option<&BetRecord>, side: BetSide) -> bool {
    match bet {
        Some(b) if !is_suspended_strict(bet) => has_odds(&b.odds(side)),
        _ => false,
    }
}

// ── Bet slip ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum SlipError {
    #[error("selection {0:?} is suspended or missing")]
    Suspended(String),
    #[error("selection {0:?} has no odds")]
    NoOdds(String),
    #[error("invalid stake amount: {0}")]
    InvalidAmount(f64),
}

/// Payload handed to the bet-placement callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetSlip {
    pub sid:    Value,
    pub nat:    String,
    pub odds:   f64,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side:   Option<BetSide>,
}

/// Validate a stake against a bet and build the slip for it.
pub fn build_bet_slip(
    bet: Option<&BetRecord>,
    side: Option<BetSide>,
    amount: f64,
) -> Result<BetSlip, SlipError> {
    let label = bet.map(|b| b.label().to_string()).unwrap_or_default();

    let bet = match bet {
        Some(b) if !is_suspended_strict(Some(b)) => b,
        _ => return Err(SlipError::Suspended(label)),
    };

    let odds = bet.formatted_odds(side.unwrap_or_default());
    let odds: f64 = odds.parse().map_err(|_| SlipError::NoOdds(label.clone()))?;
    if odds <= 0.0 {
        return Err(SlipError::NoOdds(label));
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(SlipError::InvalidAmount(amount));
    }

    Ok(BetSlip {
        sid: bet.sid.clone().unwrap_or(Value::Null),
        nat: label,
        odds,
        amount,
        side,
    })
}

/// Injected bet-placement callback. The board never talks to the backend itself.
pub trait PlaceBet {
    fn place_bet(&self, slip: &BetSlip) -> Result<()>;
}

impl<F> PlaceBet for F
where
    F: Fn(&BetSlip) -> Result<()>,
{
    fn place_bet(&self, slip: &BetSlip) -> Result<()> {
        self(slip)
    }
}

/// Build the slip and forward it verbatim to `placer`.
pub fn place_bet<P: PlaceBet + ?Sized>(
    placer: &P,
    bet: Option<&BetRecord>,
    side: Option<BetSide>,
    amount: f64,
) -> Result<BetSlip> {
    let slip = build_bet_slip(bet, side, amount)?;
    placer.place_bet(&slip)?;
    info!(nat = %slip.nat, odds = slip.odds, amount = slip.amount, "bet slip forwarded");
    Ok(slip)
}
