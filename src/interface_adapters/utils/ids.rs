use crate::domain::ConnectionId;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a process-unique connection identifier.
///
/// Ids are never reused while the process runs, so a stale disconnect can never match a
/// newer connection.
pub fn next_connection_id() -> ConnectionId {
    NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)
}
