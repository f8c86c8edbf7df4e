//! Application layer: response shaping and the in-memory resource router.
//!
//! - `shaper`: envelope and pagination block for every response
//! - `store`: collection reads and in-memory writes
//! - `filtering`: field filters, search and sorting
//! - `relations`: `_expand` / `_embed`

pub mod filtering;
pub mod relations;
pub mod shaper;
pub mod store;

pub use shaper::shape_response;
pub use store::ResourceStore;
