//! Application state shared across handlers.

use crate::core::{
    admin::{AdminGate, StaticTokenGate},
    clock::{Clock, SystemClock},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared data available to every handler.
///
/// Holds the one database handle opened at startup plus the injected clock
/// and admin gate.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all store operations
    pub database: DatabaseConnection,
    /// Source of "today" for expiration checks
    pub clock: Arc<dyn Clock>,
    /// Admin capability check
    pub gate: Arc<dyn AdminGate>,
    /// Validity period for issuance requests that omit `days`
    pub default_days: i64,
}

impl AppState {
    /// State with the wall clock and a static admin token.
    #[must_use]
    pub fn new(database: DatabaseConnection, admin_token: &str, default_days: i64) -> Self {
        Self {
            database,
            clock: Arc::new(SystemClock),
            gate: Arc::new(StaticTokenGate::new(admin_token)),
            default_days,
        }
    }

    /// Replaces the clock, for tests that need a fixed date.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
