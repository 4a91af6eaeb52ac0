//! HTTP layer - routes, handlers, and shared state for the license server.
//!
//! Handlers are thin: they check the admin gate where required, call into
//! [`crate::core`], and map verdicts and errors to status codes.

#![allow(missing_docs)]

/// Error to response mapping
pub mod error;
/// Request handlers
pub mod handlers;
/// Route table
pub mod routes;
/// Shared handler state
pub mod state;

pub use routes::build_router;
pub use state::AppState;
