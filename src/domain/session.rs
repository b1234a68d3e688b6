// Authoritative session state: roster, phase and turn cursor.

use super::errors::SessionError;
use super::player::{ConnectionId, Player, PlayerStatus};
use std::collections::HashSet;

/// Reported turn time above this many seconds eliminates the player.
pub const TURN_BUDGET_SECS: f64 = 30.0;
/// Minimum roster size required to start a game.
pub const MIN_PLAYERS_TO_START: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Lobby,
    InProgress,
}

/// Owned copy of the session used outside the lock.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub players: Vec<Player>,
    pub current_player: Option<Player>,
}

#[derive(Debug)]
pub struct SessionState {
    // Join order; also the turn rotation.
    roster: Vec<Player>,
    phase: SessionPhase,
    // Id of the player entitled to act. Only set while a game is running.
    cursor: Option<ConnectionId>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            roster: Vec::new(),
            phase: SessionPhase::Lobby,
            cursor: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn player(&self, id: ConnectionId) -> Option<&Player> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.cursor.and_then(|id| self.player(id))
    }

    pub fn can_start(&self) -> bool {
        self.phase == SessionPhase::Lobby && self.roster.len() >= MIN_PLAYERS_TO_START
    }

    pub fn active_count(&self) -> usize {
        self.roster.iter().filter(|p| p.is_active()).count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            players: self.roster.clone(),
            current_player: self.current_player().cloned(),
        }
    }

    /// Appends a new Active player for the given connection.
    pub fn add_player(&mut self, id: ConnectionId, name: String) -> Result<Player, SessionError> {
        if self.phase != SessionPhase::Lobby {
            return Err(SessionError::GameInProgress);
        }
        if self.player(id).is_some() {
            return Err(SessionError::AlreadyJoined);
        }

        let player = Player::new(id, name);
        self.roster.push(player.clone());
        self.verify()?;
        Ok(player)
    }

    /// Removes the player if present. Absent ids are a no-op.
    ///
    /// While a game is running, removing the cursor holder hands the turn to the next
    /// Active player after the vacated slot. If no Active player is left the game is
    /// abandoned and the session drops back to the lobby.
    pub fn remove_player(&mut self, id: ConnectionId) -> Option<Player> {
        let index = self.roster.iter().position(|p| p.id == id)?;
        let removed = self.roster.remove(index);

        if self.phase == SessionPhase::InProgress {
            if self.active_count() == 0 {
                self.finish_game();
            } else if self.cursor == Some(id) {
                // The vacated index now holds the player that followed the removed one.
                self.cursor = self.first_active_from(index).map(|p| p.id);
            }
        }

        Some(removed)
    }

    pub fn start_game(&mut self) -> Result<Player, SessionError> {
        if self.roster.len() < MIN_PLAYERS_TO_START {
            return Err(SessionError::NotEnoughPlayers);
        }
        if self.phase != SessionPhase::Lobby {
            return Err(SessionError::AlreadyStarted);
        }

        for player in &mut self.roster {
            player.accumulated_time = 0.0;
            player.status = PlayerStatus::Active;
        }
        self.phase = SessionPhase::InProgress;
        let first = self.roster[0].clone();
        self.cursor = Some(first.id);

        self.verify()?;
        Ok(first)
    }

    /// Stores the reported turn time and eliminates the player when it exceeds the budget.
    ///
    /// The cursor is left untouched; callers follow up with [`Self::advance_turn`] or
    /// [`Self::finish_game`].
    pub fn record_action(
        &mut self,
        id: ConnectionId,
        elapsed_seconds: f64,
    ) -> Result<Player, SessionError> {
        let phase = self.phase;
        let player = self
            .roster
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SessionError::UnknownPlayer)?;
        if phase != SessionPhase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(SessionError::InvalidElapsed);
        }

        player.accumulated_time = elapsed_seconds;
        if elapsed_seconds > TURN_BUDGET_SECS {
            player.status = PlayerStatus::Eliminated;
        }

        Ok(player.clone())
    }

    /// Moves the cursor to the next Active player after it, wrapping around.
    ///
    /// Returns `None` when nobody else is eligible, which is the win trigger.
    pub fn advance_turn(&mut self) -> Option<Player> {
        let current = self.cursor?;
        let index = self.roster.iter().position(|p| p.id == current)?;
        let len = self.roster.len();

        let next = (1..len)
            .map(|step| &self.roster[(index + step) % len])
            .find(|p| p.is_active())?
            .clone();

        self.cursor = Some(next.id);
        Some(next)
    }

    /// Ends the running game and returns the remaining Active player, if any.
    ///
    /// Everybody left in the roster goes back to Active so the lobby never holds
    /// eliminated players.
    pub fn finish_game(&mut self) -> Option<Player> {
        let winner = self.roster.iter().find(|p| p.is_active()).cloned();

        self.phase = SessionPhase::Lobby;
        self.cursor = None;
        for player in &mut self.roster {
            player.status = PlayerStatus::Active;
        }

        winner
    }

    pub fn reset(&mut self) {
        self.roster.clear();
        self.phase = SessionPhase::Lobby;
        self.cursor = None;
    }

    /// Checks the roster/phase/cursor invariants.
    pub fn verify(&self) -> Result<(), SessionError> {
        let mut seen = HashSet::with_capacity(self.roster.len());
        if let Some(dup) = self.roster.iter().find(|p| !seen.insert(p.id)) {
            return Err(SessionError::InvariantViolation(format!(
                "duplicate player id {}",
                dup.id
            )));
        }

        match self.phase {
            SessionPhase::InProgress => match self.current_player() {
                Some(player) if player.is_active() => Ok(()),
                Some(player) => Err(SessionError::InvariantViolation(format!(
                    "turn cursor on eliminated player {}",
                    player.id
                ))),
                None => Err(SessionError::InvariantViolation(
                    "game in progress without a turn cursor".to_string(),
                )),
            },
            SessionPhase::Lobby => {
                if self.cursor.is_some() {
                    return Err(SessionError::InvariantViolation(
                        "turn cursor set in lobby".to_string(),
                    ));
                }
                if let Some(player) = self.roster.iter().find(|p| !p.is_active()) {
                    return Err(SessionError::InvariantViolation(format!(
                        "eliminated player {} in lobby",
                        player.id
                    )));
                }
                Ok(())
            }
        }
    }

    // Scans `len` slots starting at `start` (inclusive), wrapping.
    fn first_active_from(&self, start: usize) -> Option<&Player> {
        let len = self.roster.len();
        (0..len)
            .map(|step| &self.roster[(start + step) % len])
            .find(|p| p.is_active())
    }
}
