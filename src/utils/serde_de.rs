//! Lenient deserializers for loosely typed backend payloads.
//!
//! The backend serializes decimals as strings ("85.00"), booleans as 0/1 and
//! leaves fields `null` where a list is expected. These helpers degrade to a
//! default instead of failing the whole page.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64).unwrap_or(0.0))
}

pub fn i64_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_f64)
        .map(|v| v as i64)
        .unwrap_or(0))
}

pub fn u32_lenient<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_f64)
        .filter(|v| *v >= 0.0)
        .map(|v| v as u32)
        .unwrap_or(0))
}

pub fn bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes"),
        _ => false,
    })
}

pub fn string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Like `string_lenient`, but `null`, a missing key or a blank string is `None`.
pub fn opt_string_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// `null` or a non-array becomes an empty list. Elements are decoded one by
/// one; an element that does not decode is skipped with a warning.
pub fn vec_lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!("Skipping undecodable row {}: {}", index, e);
                None
            }
        })
        .collect())
}

/// RFC 3339 or `YYYY-MM-DD HH:MM:SS` (taken as UTC). Anything else is `None`.
pub fn datetime_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(parse_datetime))
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "f64_lenient")]
        score: f64,
        #[serde(default, deserialize_with = "i64_lenient")]
        id: i64,
        #[serde(default, deserialize_with = "bool_lenient")]
        flag: bool,
        #[serde(default, deserialize_with = "string_lenient")]
        code: String,
    }

    #[test]
    fn accepts_strings_numbers_and_nulls() {
        let row: Row = serde_json::from_value(json!({
            "score": "85.50",
            "id": 12,
            "flag": 1,
            "code": 4411
        }))
        .unwrap();
        assert_eq!(row.score, 85.5);
        assert_eq!(row.id, 12);
        assert!(row.flag);
        assert_eq!(row.code, "4411");

        let empty: Row = serde_json::from_value(json!({"score": null})).unwrap();
        assert_eq!(empty.score, 0.0);
        assert_eq!(empty.id, 0);
        assert!(!empty.flag);
        assert!(empty.code.is_empty());
    }

    #[derive(Deserialize)]
    struct Strict {
        id: i64,
    }

    #[derive(Deserialize)]
    struct Listing {
        #[serde(default, deserialize_with = "vec_lenient")]
        rows: Vec<Strict>,
        #[serde(default, deserialize_with = "opt_string_lenient")]
        note: Option<String>,
    }

    #[test]
    fn one_bad_element_does_not_empty_the_list() {
        let listing: Listing = serde_json::from_value(json!({
            "rows": [{ "id": 1 }, { "id": "x" }, { "id": 3 }],
            "note": 7
        }))
        .unwrap();
        let ids: Vec<i64> = listing.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(listing.note.as_deref(), Some("7"));

        let blank: Listing = serde_json::from_value(json!({ "rows": null, "note": " " })).unwrap();
        assert!(blank.rows.is_empty());
        assert!(blank.note.is_none());
    }

    #[test]
    fn parses_both_timestamp_shapes() {
        let a = parse_datetime("2024-05-01T10:00:00.000000Z").unwrap();
        let b = parse_datetime("2024-05-01 10:00:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_none());
    }
}
