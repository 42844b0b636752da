//! Result-History Extractor
//!
//! "Last results" endpointy vrací pokaždé jiný tvar: holé pole, `data.res`,
//! `res`, `results`, `data.data.res`, případně je historie jen v current resultu.
//! Tady se to srovná na jedno pole posledních N výsledků.

use serde::Serialize;
use serde_json::Value;

/// Length of the last-results strip.
pub const RECENT_RESULTS_LIMIT: usize = 10;

const HISTORY_PATHS: &[&str] = &["/data/res", "/res", "/results", "/data/data/res"];
const CURRENT_PATHS: &[&str] = &["/results", "/data/res"];

const WINNER_FIELDS: &[&str] = &["win", "winner", "result", "nat"];
const ROUND_FIELDS: &[&str] = &["mid", "round", "round_id"];

fn non_empty_array(v: Option<&Value>) -> Option<&Vec<Value>> {
    v.and_then(Value::as_array).filter(|items| !items.is_empty())
}

/// Most recent `limit` results, first non-empty source wins.
///
/// Order is kept as received (newest first upstream); nothing is re-sorted.
pub fn extract_recent_results(history: &Value, current: &Value, limit: usize) -> Vec<Value> {
    let found = non_empty_array(Some(history))
        .or_else(|| HISTORY_PATHS.iter().find_map(|p| non_empty_array(history.pointer(p))))
        .or_else(|| CURRENT_PATHS.iter().find_map(|p| non_empty_array(current.pointer(p))))
        .or_else(|| non_empty_array(Some(current)));

    match found {
        Some(items) => items.iter().take(limit).cloned().collect(),
        None => Vec::new(),
    }
}

/// Display view of one history entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultHistoryEntry {
    pub winner:   Option<String>,
    pub round_id: Option<String>,
    #[serde(skip)]
    pub raw:      Value,
}

impl ResultHistoryEntry {
    pub fn from_value(raw: Value) -> Self {
        let winner = first_text(&raw, WINNER_FIELDS);
        let round_id = first_text(&raw, ROUND_FIELDS);
        Self { winner, round_id, raw }
    }
}

fn first_text(raw: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| match raw.get(f)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// [`extract_recent_results`] with each entry read into a [`ResultHistoryEntry`].
pub fn recent_entries(history: &Value, current: &Value, limit: usize) -> Vec<ResultHistoryEntry> {
    extract_recent_results(history, current, limit)
        .into_iter()
        .map(ResultHistoryEntry::from_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(n: i64) -> Value {
        Value::Array((1..=n).map(Value::from).collect())
    }

    #[test]
    fn bare_history_array_wins() {
        let got = extract_recent_results(&json!([{ "win": "1" }]), &json!({ "results": [1, 2] }), 10);
        assert_eq!(got, vec![json!({ "win": "1" })]);
    }

    #[test]
    fn falls_back_to_current_results_and_caps() {
        let got = extract_recent_results(&json!([]), &json!({ "results": numbers(15) }), RECENT_RESULTS_LIMIT);
        assert_eq!(got, (1..=10).map(Value::from).collect::<Vec<_>>());
    }

    #[test]
    fn history_paths_in_order() {
        let h = json!({ "res": [2], "data": { "res": [1] }, "results": [3] });
        assert_eq!(extract_recent_results(&h, &Value::Null, 10), vec![json!(1)]);

        let h = json!({ "data": { "res": [], "data": { "res": [4] } }, "results": [3] });
        assert_eq!(extract_recent_results(&h, &Value::Null, 10), vec![json!(3)]);

        let h = json!({ "data": { "data": { "res": [4] } } });
        assert_eq!(extract_recent_results(&h, &Value::Null, 10), vec![json!(4)]);
    }

    #[test]
    fn current_result_sources_in_order() {
        let c = json!({ "data": { "res": [6] }, "results": [] });
        assert_eq!(extract_recent_results(&Value::Null, &c, 10), vec![json!(6)]);
        assert_eq!(extract_recent_results(&json!({}), &json!([7, 8]), 1), vec![json!(7)]);
    }

    #[test]
    fn garbage_gives_empty() {
        assert!(extract_recent_results(&Value::Null, &Value::Null, 10).is_empty());
        assert!(extract_recent_results(&json!("x"), &json!({ "results": "nope" }), 10).is_empty());
        assert!(extract_recent_results(&json!({ "data": 5 }), &json!(3), 10).is_empty());
        assert!(extract_recent_results(&json!([1]), &Value::Null, 0).is_empty());
    }

    #[test]
    fn entries_read_winner_and_round() {
        let h = json!([
            { "win": "2", "mid": 10021 },
            { "winner": "Dragon", "round_id": "r-7" },
            { "result": "", "nat": "Tiger", "round": "9" },
            {},
        ]);
        let got = recent_entries(&h, &Value::Null, RECENT_RESULTS_LIMIT);
        assert_eq!(got.len(), 4);
        assert_eq!((got[0].winner.as_deref(), got[0].round_id.as_deref()), (Some("2"), Some("10021")));
        assert_eq!((got[1].winner.as_deref(), got[1].round_id.as_deref()), (Some("Dragon"), Some("r-7")));
        assert_eq!((got[2].winner.as_deref(), got[2].round_id.as_deref()), (Some("Tiger"), Some("9")));
        assert_eq!((got[3].winner.as_deref(), got[3].round_id.as_deref()), (None, None));
    }
}
