//! Pipeline stages, in the order the standard pipeline runs them.

pub mod echo;
pub mod latency;
pub mod resources;

pub use echo::EchoStage;
pub use latency::{LatencyStage, ARTIFICIAL_LATENCY};
pub use resources::ResourceStage;
