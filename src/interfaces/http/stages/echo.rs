use async_trait::async_trait;
use axum::http::{Method, StatusCode};

use crate::interfaces::http::pipeline::{Flow, RequestContext, Stage};
use crate::interfaces::http::response::render;

pub const ECHO_PATH: &str = "/echo";

/// `GET /echo` answers with the raw query parameters: no envelope, no
/// pagination, values kept as strings.
pub struct EchoStage;

#[async_trait]
impl Stage for EchoStage {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn handle(&self, ctx: &RequestContext) -> Flow {
        if ctx.method != Method::GET || ctx.path.trim_end_matches('/') != ECHO_PATH {
            return Flow::Continue;
        }
        Flow::Respond(render(StatusCode::OK, &ctx.query.to_json(), &ctx.query))
    }
}
