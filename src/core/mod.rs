//! Core business logic - framework-agnostic license operations.
//!
//! Nothing in here knows about HTTP. Handlers in [`crate::api`] translate
//! requests into calls on these modules and verdicts back into responses.

/// Admin capability gate, ban
pub mod admin;
/// Verification state machine
pub mod authority;
/// Injectable time source
pub mod clock;
/// Key generation and new licenses
pub mod issuance;
/// License status values
pub mod status;
/// Row-level persistence for licenses
pub mod store;
