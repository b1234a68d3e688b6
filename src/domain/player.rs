// Domain-level player entity and identifiers.

/// Connection-scoped identifier assigned by the transport layer.
pub type ConnectionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Active,
    Eliminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: ConnectionId,
    pub name: String,
    // Seconds reported for the current (or last) turn.
    pub accumulated_time: f64,
    pub status: PlayerStatus,
}

impl Player {
    pub fn new(id: ConnectionId, name: String) -> Self {
        Self {
            id,
            name,
            accumulated_time: 0.0,
            status: PlayerStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }
}
