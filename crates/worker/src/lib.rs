//! Background ingest workers.
//!
//! One worker per event-family topic moves raw tracking logs through the
//! normalizer into the event sink.

pub mod ingest;
pub mod scheduler;

pub use ingest::*;
pub use scheduler::*;
