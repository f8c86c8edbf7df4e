//! Raw query-string parameters and pagination parsing.

use serde_json::{Map, Value};

/// Default page number when `_page` is missing or unusable.
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size when `_limit` is missing or unusable.
pub const DEFAULT_LIMIT: u64 = 10;

/// Query parameters exactly as the client sent them.
///
/// Keys and values stay unparsed strings. Pairs keep their original order;
/// when a key is repeated, lookups return the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Last value sent for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Distinct keys with their effective (last) value, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for (key, _) in &self.pairs {
            if seen.contains(&key.as_str()) {
                continue;
            }
            seen.push(key);
            if let Some(value) = self.get(key) {
                out.push((key.as_str(), value));
            }
        }
        out.into_iter()
    }

    /// JSON object of string values, as returned by the echo endpoint.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in self.iter() {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        Value::Object(map)
    }
}

/// Page selection derived from `_page` / `_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
}

impl PaginationParams {
    /// Never fails: anything that is not a positive integer becomes the default.
    /// There is no upper bound on `limit`.
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            page: parse_positive(query.get("_page"), DEFAULT_PAGE),
            limit: parse_positive(query.get("_limit"), DEFAULT_LIMIT),
        }
    }
}

/// Lenient integer parse: optional leading whitespace and sign, then the
/// digits up to the first non-digit (`"3abc"` is 3, `"abc"` is nothing).
/// Digit runs past `u64::MAX` saturate.
pub fn parse_int_prefix(raw: &str) -> Option<i128> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0u64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
    });
    let value = i128::from(magnitude);
    Some(if negative { -value } else { value })
}

fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(parse_int_prefix)
        .and_then(|value| u64::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
