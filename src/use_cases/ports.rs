use async_trait::async_trait;

use crate::domain::ConnectionId;
use crate::use_cases::types::Notification;

// Port for delivering notifications to connected participants.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn send_to_caller(&self, caller: ConnectionId, notification: &Notification);
    async fn send_to_all(&self, notification: &Notification);
}
