// Domain layer: core session types and rules.

pub mod errors;
pub mod player;
pub mod session;

pub use errors::SessionError;
pub use player::{ConnectionId, Player, PlayerStatus};
pub use session::{
    MIN_PLAYERS_TO_START, SessionPhase, SessionSnapshot, SessionState, TURN_BUDGET_SECS,
};
