// Use-case level inputs/outputs for the session coordinator.

use crate::domain::{ConnectionId, Player};

/// Outbound notification intents produced by a session transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    GameAlreadyStarted,
    PlayerJoined(Player),
    PlayersUpdated(Vec<Player>),
    HostAssigned(bool),
    AllowStartGame,
    GameStarted,
    TurnChanged {
        players: Vec<Player>,
        current_player: Player,
        is_first_turn: bool,
    },
    // Game finished with the remaining player (if any) as winner.
    GameOverWinner(Option<Player>),
    // Lobby was explicitly ended; carries the roster after the reset.
    GameOverRoster(Vec<Player>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Caller(ConnectionId),
    All,
}

/// A notification paired with who should receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub recipient: Recipient,
    pub notification: Notification,
}

impl Dispatch {
    pub fn to_caller(caller: ConnectionId, notification: Notification) -> Self {
        Self {
            recipient: Recipient::Caller(caller),
            notification,
        }
    }

    pub fn to_all(notification: Notification) -> Self {
        Self {
            recipient: Recipient::All,
            notification,
        }
    }
}
