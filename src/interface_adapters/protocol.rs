// Wire protocol DTOs and conversions for game hub messages.

use crate::domain::{Player, PlayerStatus};
use crate::use_cases::Notification;
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Join refused because a game is running.
    GameAlreadyStarted,
    PlayerJoined(PlayerDto),
    // Full roster in turn order.
    UpdatePlayersList(Vec<PlayerDto>),
    // Sent to the joiner only; true for the first player in the lobby.
    HostAssigned(bool),
    AllowStartGame,
    GameStarted,
    TurnChanged(TurnChangedDto),
    GameOver(GameOverDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    JoinGame(JoinPayload),
    StartGame,
    // Turn submission with the client-measured elapsed time.
    ClickButton(ClickPayload),
    EndGame,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub player_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickPayload {
    // Seconds.
    pub time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub enum PlayerStatusDto {
    Active,
    Eliminated,
}

impl From<PlayerStatus> for PlayerStatusDto {
    fn from(status: PlayerStatus) -> Self {
        match status {
            PlayerStatus::Active => PlayerStatusDto::Active,
            PlayerStatus::Eliminated => PlayerStatusDto::Eliminated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub accumulated_time: f64,
    pub status: PlayerStatusDto,
}

impl From<&Player> for PlayerDto {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.to_string(),
            name: player.name.clone(),
            accumulated_time: player.accumulated_time,
            status: player.status.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnChangedDto {
    pub players: Vec<PlayerDto>,
    pub current_player: PlayerDto,
    pub is_first_turn: bool,
}

/// Game over payload: the winner (null when nobody is left) or the roster after a reset.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GameOverDto {
    Winner(Option<PlayerDto>),
    Roster(Vec<PlayerDto>),
}

fn players_dto(players: &[Player]) -> Vec<PlayerDto> {
    players.iter().map(PlayerDto::from).collect()
}

impl From<&Notification> for ServerMessage {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::GameAlreadyStarted => ServerMessage::GameAlreadyStarted,
            Notification::PlayerJoined(player) => ServerMessage::PlayerJoined(player.into()),
            Notification::PlayersUpdated(players) => {
                ServerMessage::UpdatePlayersList(players_dto(players))
            }
            Notification::HostAssigned(is_host) => ServerMessage::HostAssigned(*is_host),
            Notification::AllowStartGame => ServerMessage::AllowStartGame,
            Notification::GameStarted => ServerMessage::GameStarted,
            Notification::TurnChanged {
                players,
                current_player,
                is_first_turn,
            } => ServerMessage::TurnChanged(TurnChangedDto {
                players: players_dto(players),
                current_player: current_player.into(),
                is_first_turn: *is_first_turn,
            }),
            Notification::GameOverWinner(winner) => {
                ServerMessage::GameOver(GameOverDto::Winner(winner.as_ref().map(PlayerDto::from)))
            }
            Notification::GameOverRoster(players) => {
                ServerMessage::GameOver(GameOverDto::Roster(players_dto(players)))
            }
        }
    }
}
