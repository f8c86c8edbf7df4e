use std::time::Duration;

use async_trait::async_trait;

use crate::interfaces::http::pipeline::{Flow, RequestContext, Stage};

/// Simulated network latency for frontend development.
pub const ARTIFICIAL_LATENCY: Duration = Duration::from_millis(100);

/// Delays every request that reaches it, then continues. Only the current
/// request is suspended.
pub struct LatencyStage {
    delay: Duration,
}

impl Default for LatencyStage {
    fn default() -> Self {
        Self {
            delay: ARTIFICIAL_LATENCY,
        }
    }
}

#[async_trait]
impl Stage for LatencyStage {
    fn name(&self) -> &'static str {
        "latency"
    }

    async fn handle(&self, _ctx: &RequestContext) -> Flow {
        tokio::time::sleep(self.delay).await;
        Flow::Continue
    }
}
