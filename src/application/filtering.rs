//! Field filters, full-text search and sorting over collection records.

use std::cmp::Ordering;

use serde_json::Value;

use crate::domain::QueryParams;

/// Keys with a meaning of their own that are never field filters.
const RESERVED_KEYS: &[&str] = &["q", "callback"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Eq,
    Ne,
    Like,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldFilter<'a> {
    path: &'a str,
    op: FilterOp,
    value: &'a str,
}

impl<'a> FieldFilter<'a> {
    fn parse(key: &'a str, value: &'a str) -> Option<Self> {
        if key.is_empty() || key.starts_with('_') || RESERVED_KEYS.contains(&key) {
            return None;
        }

        let suffixes = [
            ("_ne", FilterOp::Ne),
            ("_like", FilterOp::Like),
            ("_gte", FilterOp::Gte),
            ("_lte", FilterOp::Lte),
        ];
        for (suffix, op) in suffixes {
            if let Some(path) = key.strip_suffix(suffix) {
                if !path.is_empty() {
                    return Some(Self { path, op, value });
                }
            }
        }

        Some(Self {
            path: key,
            op: FilterOp::Eq,
            value,
        })
    }

    fn matches(&self, record: &Value) -> bool {
        let field = lookup_path(record, self.path);
        match self.op {
            FilterOp::Eq => field.is_some_and(|v| any_scalar(v, |text| text == self.value)),
            FilterOp::Ne => !field.is_some_and(|v| any_scalar(v, |text| text == self.value)),
            FilterOp::Like => {
                let needle = self.value.to_lowercase();
                field.is_some_and(|v| any_scalar(v, |text| text.to_lowercase().contains(&needle)))
            }
            FilterOp::Gte => compare_numeric(field, self.value, |a, b| a >= b),
            FilterOp::Lte => compare_numeric(field, self.value, |a, b| a <= b),
        }
    }
}

/// Keep records that satisfy every field filter in `query` and, if `q` is
/// present, contain it somewhere in their values.
pub fn filter_records(records: Vec<Value>, query: &QueryParams) -> Vec<Value> {
    let filters: Vec<FieldFilter<'_>> = query
        .iter()
        .filter_map(|(key, value)| FieldFilter::parse(key, value))
        .collect();
    let search = query
        .get("q")
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    records
        .into_iter()
        .filter(|record| filters.iter().all(|filter| filter.matches(record)))
        .filter(|record| search.as_deref().map_or(true, |q| contains_text(record, q)))
        .collect()
}

/// Stable sort by `_sort=a,b` with `_order=asc,desc`. Missing fields go last
/// in both directions.
pub fn sort_records(records: &mut [Value], query: &QueryParams) {
    let Some(sort) = query.get("_sort").filter(|s| !s.is_empty()) else {
        return;
    };

    let fields: Vec<&str> = sort.split(',').map(str::trim).collect();
    let orders: Vec<bool> = query
        .get("_order")
        .unwrap_or("")
        .split(',')
        .map(|o| o.trim().eq_ignore_ascii_case("desc"))
        .collect();

    records.sort_by(|a, b| {
        for (index, field) in fields.iter().enumerate() {
            let descending = orders.get(index).copied().unwrap_or(false);
            let ordering = compare_fields(lookup_path(a, field), lookup_path(b, field), descending);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Follow a dotted path (`author.name`) through nested objects.
pub fn lookup_path<'v>(record: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

/// String form of a scalar as it would appear in a query string.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whether `value` (or, for arrays, any element) renders as `id`.
pub fn matches_id(value: Option<&Value>, id: &str) -> bool {
    value.is_some_and(|v| any_scalar(v, |text| text == id))
}

fn any_scalar(value: &Value, predicate: impl Fn(&str) -> bool) -> bool {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_text)
            .any(|text| predicate(&text)),
        other => scalar_text(other).is_some_and(|text| predicate(&text)),
    }
}

fn compare_numeric(field: Option<&Value>, raw: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let Ok(bound) = raw.trim().parse::<f64>() else {
        return false;
    };
    let actual = match field {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    actual.is_some_and(|value| cmp(value, bound))
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|item| contains_text(item, needle)),
        Value::Object(map) => map.values().any(|item| contains_text(item, needle)),
        Value::Bool(_) | Value::Null => false,
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    let (a, b) = match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => return Ordering::Equal,
    };

    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => scalar_text(a)
            .unwrap_or_default()
            .cmp(&scalar_text(b).unwrap_or_default()),
    };

    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}
