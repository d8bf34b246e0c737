//! axum-based HTTP server.
//!
//! ```text
//! GET /                 HTML page: home forecast, raining cities, radar map
//! GET /radar-timestamp  latest radar frame as JSON, or {"error": ...} with 500
//! GET /health           liveness check
//! ```

pub mod error;
pub mod handlers;
pub mod page;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
