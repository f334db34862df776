//! ClickHouse storage for learning analytics events and course structures.

pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod query;
pub mod schema;
mod store;

pub use client::ClickHouseClient;
pub use config::ClickHouseConfig;
pub use health::{check_connection, init_schema};
pub use insert::{insert_course_structure, insert_events, FamilyBatches};
pub use query::truncate_all;
