//! Ordered request pipeline
//!
//! Every non-health request walks the stages in order. A stage either lets
//! the request continue to the next stage or answers it, which ends the
//! walk. The standard order is `echo` -> `latency` -> `resources`, so
//! `/echo` answers before the artificial delay and everything after it is
//! delayed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::stages::{EchoStage, LatencyStage, ResourceStage};
use crate::application::ResourceStore;
use crate::domain::QueryParams;
use crate::shared::ApiError;

/// What a stage sees of the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: Bytes,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>, query: QueryParams) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Non-empty path segments: `/books/1/` -> `["books", "1"]`.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Result of one stage.
pub enum Flow {
    /// Hand the request to the next stage.
    Continue,
    /// Answer now; later stages do not run.
    Respond(Response),
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, ctx: &RequestContext) -> Flow;
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo, then the fixed latency, then the resource router.
    pub fn standard(store: Arc<ResourceStore>) -> Self {
        Self::new()
            .with_stage(EchoStage)
            .with_stage(LatencyStage::default())
            .with_stage(ResourceStage::new(store))
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run the stages in order; 404 when none of them answers.
    pub async fn run(&self, ctx: RequestContext) -> Response {
        for stage in &self.stages {
            if let Flow::Respond(response) = stage.handle(&ctx).await {
                debug!(stage = stage.name(), status = %response.status(), "Stage answered request");
                return response;
            }
        }

        let resource = ctx.segments().first().copied().unwrap_or("/").to_string();
        ApiError::UnknownResource(resource).into_response()
    }
}
