//! Redpanda log consumers for the learning analytics engine.

pub mod config;
pub mod consumer;
pub mod health;
pub mod topics;

pub use config::*;
pub use consumer::*;
pub use topics::*;
