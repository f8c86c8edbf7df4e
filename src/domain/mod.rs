//! Domain types: the dataset, raw query parameters and the response envelope.

pub mod dataset;
pub mod envelope;
pub mod query;

pub use dataset::Dataset;
pub use envelope::{ApiInfo, Envelope, Pagination, API_DESCRIPTION, API_VERSION};
pub use query::{PaginationParams, QueryParams, DEFAULT_LIMIT, DEFAULT_PAGE};
