//! Shared application state for the HTTP command API.

use std::sync::Arc;

use kickoff_core::CoordinatorService;
use kickoff_core::clock::{Clock, SystemClock};

/// Shared state injected into every handler.
///
/// The service serializes commands internally, so handlers share it
/// through an [`Arc`] without further locking.
#[derive(Clone)]
pub struct AppState {
    /// The command API.
    pub service: Arc<CoordinatorService>,
    /// Where handlers read `now` from.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State backed by the system clock.
    pub fn new(service: Arc<CoordinatorService>) -> Self {
        Self::with_clock(service, Arc::new(SystemClock))
    }

    /// State backed by an explicit clock.
    pub fn with_clock(service: Arc<CoordinatorService>, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }
}
