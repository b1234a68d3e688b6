// Session orchestration: sequences inbound events into state transitions and
// turns each transition into notification intents.

use super::ports::Broadcaster;
use super::types::{Dispatch, Notification, Recipient};
use crate::domain::{ConnectionId, SessionError, SessionPhase, SessionSnapshot, SessionState};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Sole writer of the session state.
///
/// Every event runs validate, mutate and plan under one lock. Notifications are delivered
/// after the lock is released, from owned snapshots.
pub struct SessionCoordinator<B> {
    state: Mutex<SessionState>,
    broadcaster: B,
}

impl<B> SessionCoordinator<B>
where
    B: Broadcaster,
{
    pub fn new(broadcaster: B) -> Self {
        Self {
            state: Mutex::new(SessionState::new()),
            broadcaster,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(broadcaster: B, state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn join(&self, caller: ConnectionId, name: String) -> Result<(), SessionError> {
        self.transition(|state| plan_join(state, caller, name)).await
    }

    pub async fn start_game(&self) -> Result<(), SessionError> {
        self.transition(plan_start).await
    }

    pub async fn submit_action(
        &self,
        caller: ConnectionId,
        elapsed_seconds: f64,
    ) -> Result<(), SessionError> {
        self.transition(|state| plan_action(state, caller, elapsed_seconds)).await
    }

    pub async fn disconnect(&self, caller: ConnectionId) -> Result<(), SessionError> {
        self.transition(|state| plan_disconnect(state, caller)).await
    }

    pub async fn end_game(&self) -> Result<(), SessionError> {
        self.transition(plan_end).await
    }

    async fn transition<F>(&self, plan: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut SessionState) -> Result<Vec<Dispatch>, SessionError>,
    {
        let dispatches = {
            let mut state = self.state.lock().await;
            let dispatches = plan(&mut *state)?;
            state.verify().inspect_err(|e| {
                error!(error = %e, "session left in an inconsistent state");
            })?;
            dispatches
        };

        self.deliver(dispatches).await;
        Ok(())
    }

    async fn deliver(&self, dispatches: Vec<Dispatch>) {
        for dispatch in dispatches {
            match dispatch.recipient {
                Recipient::Caller(caller) => {
                    self.broadcaster
                        .send_to_caller(caller, &dispatch.notification)
                        .await
                }
                Recipient::All => self.broadcaster.send_to_all(&dispatch.notification).await,
            }
        }
    }
}

// Passes expected rejections through as "nothing to send", everything else as a failure.
fn ignore_expected(event: &'static str, err: SessionError) -> Result<Vec<Dispatch>, SessionError> {
    if err.is_expected() {
        debug!(event, reason = %err, "event ignored");
        Ok(Vec::new())
    } else {
        Err(err)
    }
}

fn plan_join(
    state: &mut SessionState,
    caller: ConnectionId,
    name: String,
) -> Result<Vec<Dispatch>, SessionError> {
    let player = match state.add_player(caller, name) {
        Ok(player) => player,
        Err(SessionError::GameInProgress) => {
            info!(caller, "join rejected; game already started");
            return Ok(vec![Dispatch::to_caller(
                caller,
                Notification::GameAlreadyStarted,
            )]);
        }
        Err(e) => return ignore_expected("join", e),
    };

    let is_host = state.roster().len() == 1;
    info!(caller, player_name = %player.name, is_host, "player joined");

    let mut dispatches = vec![
        Dispatch::to_all(Notification::PlayerJoined(player)),
        Dispatch::to_all(Notification::PlayersUpdated(state.roster().to_vec())),
        Dispatch::to_caller(caller, Notification::HostAssigned(is_host)),
    ];
    if state.can_start() {
        dispatches.push(Dispatch::to_caller(caller, Notification::AllowStartGame));
    }
    Ok(dispatches)
}

fn plan_start(state: &mut SessionState) -> Result<Vec<Dispatch>, SessionError> {
    let first = match state.start_game() {
        Ok(first) => first,
        Err(e) => return ignore_expected("start", e),
    };

    info!(players = state.roster().len(), first_player = first.id, "game started");
    Ok(vec![
        Dispatch::to_all(Notification::GameStarted),
        Dispatch::to_all(Notification::TurnChanged {
            players: state.roster().to_vec(),
            current_player: first,
            is_first_turn: true,
        }),
    ])
}

fn plan_action(
    state: &mut SessionState,
    caller: ConnectionId,
    elapsed_seconds: f64,
) -> Result<Vec<Dispatch>, SessionError> {
    let actor = match state.record_action(caller, elapsed_seconds) {
        Ok(actor) => actor,
        Err(e) => return ignore_expected("action", e),
    };
    if !actor.is_active() {
        info!(caller, elapsed_seconds, "player eliminated");
    }

    // Any joined player may report, not only the turn holder, and the cursor still moves
    // on from its current holder. This mirrors the hub's ClickButton handling.
    // The actor's own elimination counts before the cursor moves.
    if state.active_count() > 1 {
        let Some(next) = state.advance_turn() else {
            return Ok(Vec::new());
        };
        debug!(caller, next_player = next.id, "turn advanced");
        return Ok(vec![Dispatch::to_all(Notification::TurnChanged {
            players: state.roster().to_vec(),
            current_player: next,
            is_first_turn: false,
        })]);
    }

    let winner = state.finish_game();
    info!(winner = ?winner.as_ref().map(|p| p.id), "game over");
    Ok(vec![Dispatch::to_all(Notification::GameOverWinner(winner))])
}

fn plan_disconnect(
    state: &mut SessionState,
    caller: ConnectionId,
) -> Result<Vec<Dispatch>, SessionError> {
    let was_running = state.phase() == SessionPhase::InProgress;
    let cursor_before = state.current_player().map(|p| p.id);

    let Some(removed) = state.remove_player(caller) else {
        return Ok(Vec::new());
    };
    info!(caller, player_name = %removed.name, "player removed");

    let mut follow_up = Vec::new();
    if was_running {
        if state.phase() == SessionPhase::Lobby {
            info!("game abandoned; no active players left");
            follow_up.push(Dispatch::to_all(Notification::GameOverWinner(None)));
        } else if state.active_count() <= 1 {
            let winner = state.finish_game();
            info!(winner = ?winner.as_ref().map(|p| p.id), "game over after disconnect");
            follow_up.push(Dispatch::to_all(Notification::GameOverWinner(winner)));
        } else if let Some(current) = state.current_player().cloned() {
            if Some(current.id) != cursor_before {
                follow_up.push(Dispatch::to_all(Notification::TurnChanged {
                    players: state.roster().to_vec(),
                    current_player: current,
                    is_first_turn: false,
                }));
            }
        }
    }

    let mut dispatches = vec![Dispatch::to_all(Notification::PlayersUpdated(
        state.roster().to_vec(),
    ))];
    dispatches.extend(follow_up);
    Ok(dispatches)
}

fn plan_end(state: &mut SessionState) -> Result<Vec<Dispatch>, SessionError> {
    // Ending only applies to the lobby; a running game is left alone.
    if state.phase() != SessionPhase::Lobby {
        debug!("end ignored; game in progress");
        return Ok(Vec::new());
    }

    state.reset();
    info!("session reset");
    Ok(vec![Dispatch::to_all(Notification::GameOverRoster(
        state.roster().to_vec(),
    ))])
}
