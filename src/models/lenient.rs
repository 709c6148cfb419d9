//! Tolerant decoders for company records.
//!
//! Catalog records are hand-edited in an admin panel, so the same field shows
//! up as a number in one document and a string in the next. Everything here
//! degrades to "absent" instead of failing the whole record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Numeric field that may arrive as a JSON number or as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LooseNumber(pub Value);

impl LooseNumber {
    /// Leading-decimal parse: `"4.5 stars"` reads as 4.5, `"abc"` as nothing.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => parse_float_prefix(s),
            _ => None,
        }
    }

    /// Leading-integer parse: `"12+"` reads as 12, `4.9` as 4.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
            Value::String(s) => parse_int_prefix(s),
            _ => None,
        }
    }

    /// Truthiness as the catalog front-end saw it: zero, empty text and null are falsy.
    pub fn is_truthy(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        Self(serde_json::json!(value))
    }
}

impl From<i64> for LooseNumber {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

/// Free-text tag or list of tags (`type`, `projectType`, awards, offers).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagField(pub Value);

impl TagField {
    pub fn text(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Value::Array(
            items.into_iter().map(|s| Value::String(s.into())).collect(),
        ))
    }

    /// Non-empty text or a non-empty list.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        }
    }

    /// Substring match on text, exact entry match on lists.
    pub fn includes(&self, needle: &str) -> bool {
        match &self.0 {
            Value::String(s) => s.contains(needle),
            Value::Array(items) => items.iter().any(|item| item.as_str() == Some(needle)),
            _ => false,
        }
    }

    /// Substring match on text and on every list entry.
    pub fn any_entry_contains(&self, needle: &str) -> bool {
        match &self.0 {
            Value::String(s) => s.contains(needle),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|entry| entry.contains(needle)),
            _ => false,
        }
    }
}

/// Accepts strings only; any other JSON type reads as absent.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Status flags stored as `true`, `"true"` or `"Yes"` depending on who wrote the record.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
        }
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v == 1.0),
        _ => false,
    })
}

/// Same as [`flag`] but keeps "not set" distinguishable.
pub fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => {
            let s = s.trim();
            Some(s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes"))
        }
        Some(_) => None,
    })
}

/// Longest leading decimal literal of `input`, after leading whitespace.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest leading integer literal of `input`, after leading whitespace.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    if end == digits_start {
        return None;
    }

    s[..end].parse::<i64>().ok()
}
