//! Card Codec: dekódování kompaktních card tokenů z result feedu
//!
//! Backend posílá karty jako krátké tokeny: rank + suit písmeno.
//! Producenti nejsou konzistentní, suit bývá zdvojený (`"KHH"`) i jednoduchý (`"KH"`):
//!   "10SS" -> 10♠
//!   "KHH"  -> K♥
//!   "ACC"  -> A♣
//!   "1DD"  -> A♦   (rank "1" je eso)
//!
//! Token `"1"` samotný je placeholder "karta ještě nerozdaná" a nikdy se nedekóduje.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Placeholder used by the feed for a card slot that has not been dealt yet.
pub const PLACEHOLDER_TOKEN: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    /// Rank prefix of a token with the suit code already removed.
    fn from_token(raw: &str) -> Option<Self> {
        if raw.starts_with("10") {
            return Some(Rank::Ten);
        }
        let rank = match raw {
            "1" | "A" => Rank::Ace,
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            _ => return None,
        };
        Some(rank)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♦")]
    Diamonds,
}

impl Suit {
    fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'S' => Some(Suit::Spades),
            b'H' => Some(Suit::Hearts),
            b'C' => Some(Suit::Clubs),
            b'D' => Some(Suit::Diamonds),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One decoded card face, ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DecodedCard {
    pub rank:   Rank,
    pub suit:   Suit,
    pub is_red: bool,
}

impl DecodedCard {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit, is_red: suit.is_red() }
    }
}

impl fmt::Display for DecodedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Splits the trailing suit code (`"SS"` or `"S"`) off an upper-cased token.
fn split_suit(token: &str) -> Option<(&str, Suit)> {
    let bytes = token.as_bytes();
    let last = *bytes.last()?;
    let suit = Suit::from_letter(last)?;

    let suit_len = if bytes.len() >= 2 && bytes[bytes.len() - 2] == last { 2 } else { 1 };
    Some((&token[..token.len() - suit_len], suit))
}

/// Decode a single card token. `None` for empty input, the `"1"` placeholder
/// and anything that is not a rank followed by a known suit code.
pub fn decode_card(token: &str) -> Option<DecodedCard> {
    let token = token.trim().to_ascii_uppercase();
    if token.is_empty() || token == PLACEHOLDER_TOKEN {
        return None;
    }

    let (rank_part, suit) = split_suit(&token)?;
    let rank = Rank::from_token(rank_part)?;
    Some(DecodedCard::new(rank, suit))
}

/// Decode a comma-separated hand (`"QCC,2HH,9CC,1,KHH"`).
///
/// Placeholders and empty slots are filtered out. Malformed tokens are dropped
/// so one bad card from upstream never hides the rest of the hand.
pub fn decode_card_list(csv: &str) -> Vec<DecodedCard> {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != PLACEHOLDER_TOKEN)
        .filter_map(|t| {
            let card = decode_card(t);
            if card.is_none() {
                debug!("card_codec: dropping malformed token {:?}", t);
            }
            card
        })
        .collect()
}

/// Decode the `card` field of a detail-result record.
pub fn decode_card_field(record: &Value) -> Vec<DecodedCard> {
    match record.get("card").and_then(Value::as_str) {
        Some(csv) => decode_card_list(csv),
        None => Vec::new(),
    }
}
