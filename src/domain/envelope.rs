//! Response envelope returned by every resource endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const API_VERSION: &str = "1.0";
pub const API_DESCRIPTION: &str = "Library API with authors, books and libraries";

/// Static descriptor attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub version: String,
    pub description: String,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            version: API_VERSION.to_string(),
            description: API_DESCRIPTION.to_string(),
        }
    }
}

/// Page metadata for list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Requested page (1-based)
    pub page: u64,
    /// Requested page size
    pub limit: u64,
    /// Length of the whole collection
    pub total: u64,
    /// `ceil(total / limit)`
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

/// `{ data, pagination?, info }`
///
/// `pagination` is omitted from the JSON entirely (not `null`) when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub info: ApiInfo,
}

impl Envelope {
    pub fn single(data: Value) -> Self {
        Self {
            data,
            pagination: None,
            info: ApiInfo::default(),
        }
    }

    pub fn paginated(data: Value, pagination: Pagination) -> Self {
        Self {
            data,
            pagination: Some(pagination),
            info: ApiInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 2, 5).total_pages, 3);
        assert_eq!(Pagination::new(1, 5, 5).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn pagination_serializes_camel_case() {
        let value = serde_json::to_value(Pagination::new(3, 2, 5)).unwrap();
        assert_eq!(
            value,
            json!({"page": 3, "limit": 2, "total": 5, "totalPages": 3})
        );
    }

    #[test]
    fn single_envelope_has_no_pagination_key() {
        let value = serde_json::to_value(Envelope::single(json!({"id": 1}))).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("pagination"));
        assert_eq!(
            object["info"],
            json!({"version": "1.0", "description": API_DESCRIPTION})
        );
    }
}
