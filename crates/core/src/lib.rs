//! Core types, log normalization and curve building for the learning
//! analytics engine.

pub mod analysis;
pub mod course;
pub mod curve;
pub mod error;
pub mod events;
pub mod limits;
pub mod normalize;
pub mod raw;
pub mod store;

pub use analysis::Analyser;
pub use course::*;
pub use curve::*;
pub use error::{Error, ParseError, Result};
pub use events::*;
pub use normalize::{normalize, normalize_family};
pub use store::*;
