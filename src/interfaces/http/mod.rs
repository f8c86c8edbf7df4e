//! HTTP interface
//!
//! - `router`: axum router, layers and shared state
//! - `pipeline`: ordered, short-circuiting request stages
//! - `stages`: echo, latency and resource stages
//! - `response`: JSON / JSONP rendering and error mapping
//! - `request_id`: `X-Request-Id` propagation
//! - `handlers`: routes served outside the pipeline

pub mod handlers;
pub mod pipeline;
pub mod request_id;
pub mod response;
pub mod router;
pub mod stages;

pub use pipeline::{Flow, Pipeline, RequestContext, Stage};
pub use router::{create_router, AppState};
