// Field adapters for decoded reply trees
//
// Everything in a reply arrives as text: numbers are `"12"` or
// `"12.000000"`, booleans are marker elements, and a repeated element
// collapses to a single object when it occurs once. These adapters are
// used with `#[serde(deserialize_with = "...")]` on wire models.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::reply::parse_int;

fn parse_text<T, E>(text: &str) -> Result<T, E>
where
    T: FromStr,
    T::Err: Display,
    E: serde::de::Error,
{
    let text = text.trim();
    match text.parse::<T>() {
        Ok(v) => Ok(v),
        // "3.000000" for an integer field
        Err(err) => parse_int(text)
            .and_then(|n| n.to_string().parse::<T>().ok())
            .ok_or_else(|| E::custom(format!("invalid number {text:?}: {err}"))),
    }
}

/// Required numeric field.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => parse_text(&s),
        Value::Number(n) => parse_text(&n.to_string()),
        other => Err(D::Error::custom(format!("expected number, got {other}"))),
    }
}

/// Optional numeric field; empty text is `None`. Pair with `#[serde(default)]`.
pub fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_text(&s).map(Some),
        Value::Number(n) => parse_text(&n.to_string()).map(Some),
        other => Err(D::Error::custom(format!("expected number, got {other}"))),
    }
}

/// Marker element as a boolean: present (or `1`) is `true`, `0` is `false`.
/// Pair with `#[serde(default)]` so absence is `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(!matches!(s.trim(), "0" | "false")),
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        _ => Ok(true),
    }
}

/// Optional text; empty elements are `None`. Pair with `#[serde(default)]`.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        other => Err(D::Error::custom(format!("expected text, got {other}"))),
    }
}

/// Repeated child element as a list. Pair with `#[serde(default)]`.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    one_or_many(&Value::deserialize(deserializer)?)
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(D::Error::custom))
        .collect()
}

/// Normalize a repeated-element value to a list: an array is itself,
/// an empty element is no items, anything else is one item.
pub fn one_or_many(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}
