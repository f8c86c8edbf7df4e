//! Resource routes over the in-memory store
//!
//! | Path                     | Methods                        |
//! |--------------------------|--------------------------------|
//! | `/`                      | GET (resource index)           |
//! | `/db`                    | GET (whole document)           |
//! | `/<resource>`            | GET, POST; PUT/PATCH singulars |
//! | `/<resource>/<id>`       | GET, PUT, PATCH, DELETE        |
//! | `/<parent>/<id>/<child>` | GET, POST                      |
//!
//! HEAD is answered wherever GET is. Deeper paths are unknown resources.
//!
//! Every successful result goes through [`shape_response`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;

use crate::application::relations::singularize;
use crate::application::{shape_response, ResourceStore};
use crate::interfaces::http::pipeline::{Flow, RequestContext, Stage};
use crate::interfaces::http::response::render;
use crate::shared::ApiError;

pub struct ResourceStage {
    store: Arc<ResourceStore>,
}

impl ResourceStage {
    pub fn new(store: Arc<ResourceStore>) -> Self {
        Self { store }
    }

    async fn dispatch(&self, ctx: &RequestContext) -> Result<(StatusCode, Value), ApiError> {
        let store = &self.store;
        let query = &ctx.query;

        match (read_as_get(&ctx.method), ctx.segments().as_slice()) {
            (Method::GET, []) => {
                let names = store.resource_names().await;
                Ok((StatusCode::OK, Value::from(names)))
            }
            (Method::GET, ["db"]) => Ok((StatusCode::OK, store.snapshot().await)),

            (Method::GET, [resource]) => Ok((StatusCode::OK, store.list(resource, query).await?)),
            (Method::POST, [resource]) => match store.is_collection(resource).await {
                Some(true) => {
                    let created = store.create(resource, body(ctx)?).await?;
                    Ok((StatusCode::CREATED, created))
                }
                Some(false) => {
                    let replaced = store.update_singular(resource, body(ctx)?, false).await?;
                    Ok((StatusCode::OK, replaced))
                }
                None => Err(ApiError::UnknownResource(resource.to_string())),
            },
            (Method::PUT, [resource]) => Ok((
                StatusCode::OK,
                store.update_singular(resource, body(ctx)?, false).await?,
            )),
            (Method::PATCH, [resource]) => Ok((
                StatusCode::OK,
                store.update_singular(resource, body(ctx)?, true).await?,
            )),

            (Method::GET, [resource, id]) => {
                Ok((StatusCode::OK, store.get(resource, id, query).await?))
            }
            (Method::PUT, [resource, id]) => Ok((
                StatusCode::OK,
                store.replace(resource, id, body(ctx)?).await?,
            )),
            (Method::PATCH, [resource, id]) => Ok((
                StatusCode::OK,
                store.patch(resource, id, body(ctx)?).await?,
            )),
            (Method::DELETE, [resource, id]) => {
                Ok((StatusCode::OK, store.delete(resource, id).await?))
            }

            (Method::GET, [parent, id, child]) => Ok((
                StatusCode::OK,
                store.list_nested(parent, id, child, query).await?,
            )),
            (Method::POST, [parent, id, child]) => {
                // Ensure the parent exists before linking the child to it.
                store.get(parent, id, &Default::default()).await?;
                let mut record = body(ctx)?;
                if let Value::Object(fields) = &mut record {
                    let foreign_key = format!("{}Id", singularize(parent));
                    fields.insert(foreign_key, parse_id(id));
                }
                Ok((StatusCode::CREATED, store.create(child, record).await?))
            }

            (_, [resource, _, _, _, ..]) => Err(ApiError::UnknownResource(resource.to_string())),
            (method, _) => Err(ApiError::MethodNotAllowed {
                method: method.to_string(),
                path: ctx.path.clone(),
            }),
        }
    }
}

#[async_trait]
impl Stage for ResourceStage {
    fn name(&self) -> &'static str {
        "resources"
    }

    async fn handle(&self, ctx: &RequestContext) -> Flow {
        let response = match self.dispatch(ctx).await {
            Ok((status, data)) => {
                let envelope = shape_response(&read_as_get(&ctx.method), &data, &ctx.query);
                render(status, &envelope, &ctx.query)
            }
            Err(e @ ApiError::MethodNotAllowed { .. }) => {
                let allow = allowed_methods(ctx.segments().len());
                let mut response = e.into_response();
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static(allow));
                response
            }
            Err(e) => {
                tracing::debug!(
                    method = %ctx.method,
                    path = %ctx.path,
                    "Resource request failed: {}",
                    e
                );
                e.into_response()
            }
        };
        Flow::Respond(response)
    }
}

/// HEAD is routed and shaped exactly like GET; the server drops the body.
fn read_as_get(method: &Method) -> Method {
    if *method == Method::HEAD {
        Method::GET
    } else {
        method.clone()
    }
}

/// `Allow` header value for a path with `depth` segments.
fn allowed_methods(depth: usize) -> &'static str {
    match depth {
        0 => "GET, HEAD",
        1 => "GET, HEAD, POST, PUT, PATCH",
        2 => "GET, HEAD, PUT, PATCH, DELETE",
        _ => "GET, HEAD, POST",
    }
}

fn body(ctx: &RequestContext) -> Result<Value, ApiError> {
    if ctx.body.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(&ctx.body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// Path ids that look numeric are stored as numbers, like the dataset's own ids.
fn parse_id(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::Response;
    use serde_json::json;

    use crate::domain::{Dataset, QueryParams};

    fn stage() -> ResourceStage {
        let dataset = Dataset::from_value(json!({
            "books": [
                {"id": 1, "title": "War and Peace", "authorId": 1},
                {"id": 2, "title": "Dead Souls", "authorId": 2},
                {"id": 3, "title": "Anna Karenina", "authorId": 1},
                {"id": 4, "title": "The Nose", "authorId": 2},
                {"id": 5, "title": "Taras Bulba", "authorId": 2}
            ],
            "authors": [{"id": 1, "name": "Leo Tolstoy"}, {"id": 2, "name": "Nikolai Gogol"}],
            "profile": {"name": "City library"}
        }))
        .unwrap();
        ResourceStage::new(Arc::new(ResourceStore::new(dataset)))
    }

    async fn call(stage: &ResourceStage, ctx: RequestContext) -> (StatusCode, Value) {
        let Flow::Respond(response) = stage.handle(&ctx).await else {
            panic!("resource stage always answers");
        };
        split(response).await
    }

    async fn split(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(path: &str, pairs: &[(&str, &str)]) -> RequestContext {
        RequestContext::new(Method::GET, path, QueryParams::from_pairs(pairs.iter().copied()))
    }

    #[tokio::test]
    async fn list_scenario_keeps_full_collection() {
        let ctx = get("/books", &[("_limit", "2"), ("_page", "3")]);
        let (status, body) = call(&stage(), ctx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["pagination"],
            json!({"page": 3, "limit": 2, "total": 5, "totalPages": 3})
        );
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["info"]["version"], "1.0");
    }

    #[tokio::test]
    async fn filtered_total_counts_matches() {
        let (_, body) = call(&stage(), get("/books", &[("authorId", "2")])).await;
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["totalPages"], 1);
    }

    #[tokio::test]
    async fn single_record_has_no_pagination() {
        let (status, body) = call(&stage(), get("/books/2", &[("_page", "2")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Dead Souls");
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn singular_resource_has_no_pagination() {
        let (_, body) = call(&stage(), get("/profile", &[])).await;
        assert_eq!(body["data"], json!({"name": "City library"}));
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn index_lists_resource_names() {
        let (_, body) = call(&stage(), get("/", &[])).await;
        assert_eq!(body["data"], json!(["books", "authors", "profile"]));
    }

    #[tokio::test]
    async fn unknown_resource_and_id_are_not_found() {
        let stage = stage();
        assert_eq!(call(&stage, get("/magazines", &[])).await.0, StatusCode::NOT_FOUND);
        assert_eq!(call(&stage, get("/books/99", &[])).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn write_cycle() {
        let stage = stage();

        let create = RequestContext::new(Method::POST, "/books", QueryParams::new())
            .with_body(r#"{"title":"The Overcoat","authorId":2}"#);
        let (status, body) = call(&stage, create).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 6);
        assert!(body.get("pagination").is_none());

        let patch = RequestContext::new(Method::PATCH, "/books/6", QueryParams::new())
            .with_body(r#"{"year":1842}"#);
        let (_, body) = call(&stage, patch).await;
        assert_eq!(body["data"]["title"], "The Overcoat");
        assert_eq!(body["data"]["year"], 1842);

        let delete = RequestContext::new(Method::DELETE, "/books/6", QueryParams::new());
        let (status, body) = call(&stage, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({}));
    }

    #[tokio::test]
    async fn invalid_json_body_is_bad_request() {
        let ctx = RequestContext::new(Method::POST, "/books", QueryParams::new()).with_body("nope");
        assert_eq!(call(&stage(), ctx).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nested_routes_link_children() {
        let stage = stage();
        let (_, body) = call(&stage, get("/authors/1/books", &[])).await;
        assert_eq!(body["pagination"]["total"], 2);

        let create = RequestContext::new(Method::POST, "/authors/1/books", QueryParams::new())
            .with_body(r#"{"title":"Resurrection"}"#);
        let (status, body) = call(&stage, create).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["authorId"], 1);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected_with_allow_header() {
        let ctx = RequestContext::new(Method::DELETE, "/books", QueryParams::new());
        let Flow::Respond(response) = stage().handle(&ctx).await else {
            panic!("resource stage always answers");
        };
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD, POST, PUT, PATCH");
    }

    #[tokio::test]
    async fn head_is_answered_like_get() {
        let ctx = RequestContext::new(Method::HEAD, "/books", QueryParams::new());
        let (status, body) = call(&stage(), ctx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 5);
    }

    #[tokio::test]
    async fn db_returns_whole_document_without_pagination() {
        let stage = stage();
        let delete = RequestContext::new(Method::DELETE, "/books/5", QueryParams::new());
        call(&stage, delete).await;

        let (status, body) = call(&stage, get("/db", &[("_page", "2")])).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("pagination").is_none());
        assert_eq!(body["data"]["books"].as_array().unwrap().len(), 4);
        assert_eq!(body["data"]["profile"], json!({"name": "City library"}));
    }

    #[tokio::test]
    async fn paths_deeper_than_nested_routes_are_unknown() {
        let ctx = get("/authors/1/books/2", &[]);
        assert_eq!(call(&stage(), ctx).await.0, StatusCode::NOT_FOUND);
    }
}
