use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::ConnectionId;
use crate::use_cases::ports::Broadcaster;
use crate::use_cases::types::{Dispatch, Notification};

// Broadcaster fake that records every delivery in order.
#[derive(Clone, Default)]
pub(crate) struct RecordingBroadcaster {
    sent: Arc<Mutex<Vec<Dispatch>>>,
}

impl RecordingBroadcaster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // Drains everything delivered so far.
    pub(crate) fn take(&self) -> Vec<Dispatch> {
        let mut guard = self.sent.lock().expect("sent mutex poisoned");
        std::mem::take(&mut *guard)
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn send_to_caller(&self, caller: ConnectionId, notification: &Notification) {
        let mut guard = self.sent.lock().expect("sent mutex poisoned");
        guard.push(Dispatch::to_caller(caller, notification.clone()));
    }

    async fn send_to_all(&self, notification: &Notification) {
        let mut guard = self.sent.lock().expect("sent mutex poisoned");
        guard.push(Dispatch::to_all(notification.clone()));
    }
}
