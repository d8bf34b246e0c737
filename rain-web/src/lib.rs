//! HTTP front end for the rain forecast app.
//!
//! The binary in `main.rs` wires configuration and logging; everything that
//! serves requests lives in [`http`] so it can be exercised from tests.

pub mod http;

pub use http::{AppState, create_router};
