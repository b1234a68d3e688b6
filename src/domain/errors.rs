use std::fmt;

// Domain-level errors for session transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    // A mutation would have broken a roster/phase invariant. Always a bug.
    InvariantViolation(String),
    GameInProgress,
    AlreadyStarted,
    NotEnoughPlayers,
    NotInProgress,
    UnknownPlayer,
    AlreadyJoined,
    InvalidElapsed,
}

impl SessionError {
    /// Expected rejections are handled by the coordinator and never surface as failures.
    pub fn is_expected(&self) -> bool {
        !matches!(self, SessionError::InvariantViolation(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvariantViolation(detail) => {
                write!(f, "session invariant violated: {detail}")
            }
            SessionError::GameInProgress => f.write_str("game in progress"),
            SessionError::AlreadyStarted => f.write_str("game already started"),
            SessionError::NotEnoughPlayers => f.write_str("not enough players"),
            SessionError::NotInProgress => f.write_str("no game in progress"),
            SessionError::UnknownPlayer => f.write_str("unknown player"),
            SessionError::AlreadyJoined => f.write_str("connection already joined"),
            SessionError::InvalidElapsed => f.write_str("elapsed time must be finite and >= 0"),
        }
    }
}

impl std::error::Error for SessionError {}
