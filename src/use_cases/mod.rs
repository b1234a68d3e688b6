// Use cases layer: application workflows for the game session.

pub mod coordinator;
pub mod ports;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::SessionCoordinator;
pub use ports::Broadcaster;
pub use types::{Dispatch, Notification, Recipient};
