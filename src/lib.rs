//! # Library API
//!
//! Mock REST server over a JSON dataset of books, authors, libraries and
//! users, for frontend development.
//!
//! ## Architecture
//!
//! - **domain**: dataset, raw query parameters, response envelope
//! - **application**: response shaping and the in-memory resource router
//! - **interfaces**: axum router and the ordered request pipeline
//!   (`echo` -> `latency` -> `resources`)
//! - **shared**: error types and graceful shutdown
//! - **config** / **server**: configuration loading and the runtime

pub mod application;
pub mod config;
pub mod domain;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use application::{shape_response, ResourceStore};
pub use config::AppConfig;
pub use domain::{Dataset, Envelope, Pagination, QueryParams};
pub use interfaces::http::{create_router, AppState, Pipeline};
