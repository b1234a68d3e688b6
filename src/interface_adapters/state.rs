use crate::interface_adapters::hub::ConnectionHub;
use crate::use_cases::SessionCoordinator;
use std::sync::Arc;

/// The single global session, delivering through the connection hub.
pub type GameCoordinator = SessionCoordinator<ConnectionHub>;

#[derive(Clone)]
pub struct AppState {
    // Owns the session state; its broadcaster is the live connection hub.
    pub coordinator: Arc<GameCoordinator>,
    // Per-connection outbound queue size.
    pub outbound_capacity: usize,
}

impl AppState {
    pub fn hub(&self) -> &ConnectionHub {
        self.coordinator.broadcaster()
    }
}
