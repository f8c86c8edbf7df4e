//! Response shaping: wraps a resource payload in the API envelope.

use axum::http::Method;
use serde_json::Value;

use crate::domain::{Envelope, Pagination, PaginationParams, QueryParams};

/// Build the envelope for `data`.
///
/// A `GET` of a list gets a pagination block computed from `_page` /
/// `_limit`; everything else gets `{ data, info }`. `total` is the length
/// of the list as given and `data` is passed through whole, not sliced to
/// the requested page.
///
/// Pure and infallible: bad pagination input falls back to the defaults.
pub fn shape_response(method: &Method, data: &Value, query: &QueryParams) -> Envelope {
    match data {
        Value::Array(items) if *method == Method::GET => {
            let params = PaginationParams::from_query(query);
            let pagination = Pagination::new(params.page, params.limit, items.len() as u64);
            Envelope::paginated(data.clone(), pagination)
        }
        _ => Envelope::single(data.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn list_scenario_reports_page_metadata_over_full_list() {
        let list = json!(["a", "b", "c", "d", "e"]);
        let params = query(&[("_limit", "2"), ("_page", "3")]);
        let envelope = shape_response(&Method::GET, &list, &params);

        assert_eq!(envelope.pagination, Some(Pagination::new(3, 2, 5)));
        assert_eq!(envelope.pagination.unwrap().total_pages, 3);
        assert_eq!(envelope.data, list);
    }

    #[test]
    fn total_pages_is_ceiling_for_many_sizes() {
        for len in 0..25usize {
            let list = Value::Array((0..len).map(|i| json!(i)).collect());
            for limit in 1..8u64 {
                let limit_text = limit.to_string();
                let envelope =
                    shape_response(&Method::GET, &list, &query(&[("_limit", limit_text.as_str())]));
                let pagination = envelope.pagination.unwrap();
                assert_eq!(pagination.total, len as u64);
                assert_eq!(pagination.total_pages, (len as u64).div_ceil(limit));
            }
        }
    }

    #[test]
    fn empty_query_defaults_to_first_page_of_ten() {
        let envelope = shape_response(&Method::GET, &json!([1, 2, 3]), &QueryParams::new());
        let pagination = envelope.pagination.unwrap();
        assert_eq!((pagination.page, pagination.limit), (1, 10));
        assert_eq!(pagination.total_pages, 1);
    }

    #[test]
    fn non_numeric_page_defaults_to_one() {
        let envelope = shape_response(&Method::GET, &json!([1]), &query(&[("_page", "abc")]));
        assert_eq!(envelope.pagination.unwrap().page, 1);
    }

    #[test]
    fn single_object_never_has_pagination() {
        let record = json!({"id": 1, "title": "War and Peace"});
        for params in [query(&[]), query(&[("_page", "2"), ("_limit", "5")])] {
            let envelope = shape_response(&Method::GET, &record, &params);
            assert!(envelope.pagination.is_none());
            let body = serde_json::to_value(&envelope).unwrap();
            assert!(body.get("pagination").is_none());
        }
    }

    #[test]
    fn non_get_list_has_no_pagination() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let envelope = shape_response(&method, &json!([1, 2]), &QueryParams::new());
            assert!(envelope.pagination.is_none());
        }
    }

    #[test]
    fn data_is_not_mutated() {
        let data = json!([{"id": 1}, {"id": 2}]);
        let before = data.clone();
        let envelope = shape_response(&Method::GET, &data, &query(&[("_limit", "1")]));
        assert_eq!(data, before);
        assert_eq!(envelope.data, before);
    }

    #[test]
    fn info_is_static() {
        let a = shape_response(&Method::GET, &json!([]), &QueryParams::new());
        let b = shape_response(&Method::DELETE, &json!({}), &QueryParams::new());
        assert_eq!(a.info, b.info);
        assert_eq!(a.info.version, "1.0");
    }
}
