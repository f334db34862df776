//! HTTP API serving route and watching curves.

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
