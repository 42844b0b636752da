//! Odds Normalizer
//!
//! Upstream feed posílá odds dvojím způsobem:
//!   - decimální multiplikátor (`1.97`)
//!   - fixed-point ×100000 jako integer (`197000`), aby se neztrácela přesnost floatů
//!
//! Cokoliv nad 1000 je fixed-point. Tenhle threshold je vlastnost wire formátu,
//! neměnit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Raw values above this are fixed-point encoded.
pub const FIXED_POINT_THRESHOLD: f64 = 1000.0;
/// Scale of the fixed-point encoding.
pub const FIXED_POINT_SCALE: f64 = 100_000.0;
/// What every absent odds value formats to.
pub const NO_ODDS: &str = "0.00";

/// Which side of the book a price is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetSide {
    #[default]
    Back,
    Lay,
}

impl BetSide {
    /// Legacy field names carrying this side's price, in precedence order.
    pub fn odds_fields(self) -> &'static [&'static str] {
        match self {
            BetSide::Back => &["back", "b", "b1", "odds"],
            BetSide::Lay => &["lay", "l"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BetSide::Back => "back",
            BetSide::Lay => "lay",
        }
    }
}

impl fmt::Display for BetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "back" | "" => Ok(BetSide::Back),
            "lay" => Ok(BetSide::Lay),
            other => Err(format!("unknown bet side: {other}")),
        }
    }
}

/// Anything a price can be read from by legacy field name.
pub trait OddsSource {
    fn odds_field(&self, name: &str) -> Option<&Value>;
}

impl OddsSource for Value {
    fn odds_field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl OddsSource for Map<String, Value> {
    fn odds_field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Raw price for `side`: first defined legacy field wins, `0` when none is.
pub fn get_odds<T: OddsSource + ?Sized>(bet: &T, side: BetSide) -> Value {
    side.odds_fields()
        .iter()
        .filter_map(|name| bet.odds_field(name))
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| Value::from(0))
}

/// Numeric reading of a raw odds value, following JS `Number()` for strings.
fn raw_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Decimal odds behind a raw feed value; `0.0` for every absent form.
///
/// Negative prices are treated as absent.
pub fn normalize_odds(raw: &Value) -> f64 {
    match raw_number(raw) {
        Some(n) if n > FIXED_POINT_THRESHOLD => n / FIXED_POINT_SCALE,
        Some(n) if n > 0.0 => n,
        _ => 0.0,
    }
}

/// Display string for a raw odds value, always two decimals (`"1.97"`, `"0.00"`).
pub fn format_odds(raw: &Value) -> String {
    let odds = normalize_odds(raw);
    if odds <= 0.0 {
        return NO_ODDS.to_string();
    }
    to_fixed_2(odds)
}

/// `true` when the value formats to something other than `"0.00"`.
pub fn has_odds(raw: &Value) -> bool {
    format_odds(raw) != NO_ODDS
}

/// Two-decimal formatting with JS `toFixed` tie behavior.
///
/// `format!` rounds exact binary ties to even (`0.125` -> `"0.12"`), `toFixed`
/// picks the larger neighbour (`"0.13"`). Exact ties at two decimals only exist
/// for odd multiples of 1/8.
fn to_fixed_2(x: f64) -> String {
    let eighths = x * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return format!("{:.2}", (x * 100.0).ceil() / 100.0);
    }
    format!("{:.2}", x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_values_format_to_zero() {
        for raw in [json!(0), Value::Null, json!(""), json!("abc"), json!(false), json!([]), json!({})] {
            assert_eq!(format_odds(&raw), "0.00", "raw = {raw}");
            assert!(!has_odds(&raw));
        }
    }

    #[test]
    fn plain_decimal_odds() {
        assert_eq!(format_odds(&json!(1.97)), "1.97");
        assert_eq!(format_odds(&json!(2)), "2.00");
        assert_eq!(format_odds(&json!(1000)), "1000.00");
        assert_eq!(format_odds(&json!(" 1.5 ")), "1.50");
    }

    #[test]
    fn fixed_point_odds_are_scaled() {
        assert_eq!(format_odds(&json!(197000)), "1.97");
        assert_eq!(format_odds(&json!(1001)), "0.01");
        assert_eq!(format_odds(&json!(98000)), "0.98");
        assert_eq!(format_odds(&json!("250000")), "2.50");
    }

    #[test]
    fn ties_round_like_to_fixed() {
        assert_eq!(format_odds(&json!(0.125)), "0.13");
        assert_eq!(format_odds(&json!(1.375)), "1.38");
        assert_eq!(format_odds(&json!(2.5)), "2.50");
        // 1.005 is stored slightly below the tie
        assert_eq!(format_odds(&json!(1.005)), "1.00");
    }

    fn cents(c: u64) -> String {
        format!("{}.{:02}", c / 100, c % 100)
    }

    #[test]
    fn decimal_range_formats_to_two_places() {
        let mut c = 1u64;
        while c <= 100_000 {
            let below: f64 = format!("{}4", cents(c)).parse().unwrap();
            let above: f64 = format!("{}6", cents(c)).parse().unwrap();
            let exact: f64 = cents(c).parse().unwrap();
            assert_eq!(format_odds(&json!(exact)), cents(c));
            if below <= FIXED_POINT_THRESHOLD {
                assert_eq!(format_odds(&json!(below)), cents(c));
            }
            if above <= FIXED_POINT_THRESHOLD {
                assert_eq!(format_odds(&json!(above)), cents(c + 1));
            }
            c += 37;
        }
        assert_eq!(format_odds(&json!(1000.0)), "1000.00");
    }

    #[test]
    fn fixed_point_range_is_scaled_then_formatted() {
        assert_eq!(format_odds(&json!(1000.0001)), "0.01");
        assert_eq!(format_odds(&json!(1001)), "0.01");

        let mut c = 2u64;
        while c <= 1_000_000 {
            assert_eq!(format_odds(&json!(c * 1000)), cents(c));
            assert_eq!(format_odds(&json!(c * 1000 + 400)), cents(c));
            assert_eq!(format_odds(&json!(c * 1000 + 600)), cents(c + 1));
            c += 997;
        }
    }

    #[test]
    fn negative_and_tiny_values_are_absent() {
        assert_eq!(format_odds(&json!(-1.5)), "0.00");
        assert_eq!(format_odds(&json!(0.001)), "0.00");
        assert!(!has_odds(&json!(0.001)));
    }

    #[test]
    fn output_always_has_two_decimals() {
        for raw in [json!(1.23456), json!(123456789), json!(7), json!(999.999)] {
            let s = format_odds(&raw);
            let (_, frac) = s.split_once('.').unwrap();
            assert_eq!(frac.len(), 2, "{s}");
            assert!(s.parse::<f64>().unwrap() >= 0.0);
        }
    }

    #[test]
    fn get_odds_back_precedence() {
        assert_eq!(get_odds(&json!({ "b": 1.8, "back": 1.9 }), BetSide::Back), json!(1.9));
        assert_eq!(get_odds(&json!({ "b1": 2.1, "odds": 3 }), BetSide::Back), json!(2.1));
        assert_eq!(get_odds(&json!({ "back": null, "odds": 3 }), BetSide::Back), json!(3));
        assert_eq!(get_odds(&json!({ "lay": 2.0 }), BetSide::Back), json!(0));
    }

    #[test]
    fn get_odds_lay_precedence() {
        assert_eq!(get_odds(&json!({ "l": 1.5, "lay": 1.6 }), BetSide::Lay), json!(1.6));
        assert_eq!(get_odds(&json!({ "l": 1.5, "back": 9 }), BetSide::Lay), json!(1.5));
        assert_eq!(get_odds(&Value::Null, BetSide::Lay), json!(0));
    }

    #[test]
    fn bet_side_parses() {
        assert_eq!("LAY".parse::<BetSide>(), Ok(BetSide::Lay));
        assert_eq!("".parse::<BetSide>(), Ok(BetSide::Back));
        assert!("sideways".parse::<BetSide>().is_err());
        assert_eq!(BetSide::default(), BetSide::Back);
    }
}
