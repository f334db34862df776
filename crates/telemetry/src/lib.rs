//! Tracing setup, in-process metrics and component health for the
//! learning analytics engine.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
