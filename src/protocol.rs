//! Wire schema for the live overlay channels.
//!
//! Every frame is a JSON object tagged by `type` with a variant specific
//! `value`. The `date` field is never trusted from the sender: it is stamped
//! locally when the frame is turned into an action.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Chat,
    #[serde(rename = "gamestate")]
    GameState,
    Connected,
    Winner,
    Betting,
    Roshan,
    Pause,
}

impl MessageType {
    pub const ALL: [MessageType; 7] = [
        MessageType::Chat,
        MessageType::GameState,
        MessageType::Connected,
        MessageType::Winner,
        MessageType::Betting,
        MessageType::Roshan,
        MessageType::Pause,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Chat => "chat",
            MessageType::GameState => "gamestate",
            MessageType::Connected => "connected",
            MessageType::Winner => "winner",
            MessageType::Betting => "betting",
            MessageType::Roshan => "roshan",
            MessageType::Pause => "pause",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FrameError::UnknownType(s.to_string()))
    }
}

/// Match phase as reported by the game state integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    #[serde(rename = "DOTA_GAMERULES_STATE_WAIT_FOR_PLAYERS_TO_LOAD")]
    WaitForPlayersToLoad,
    #[serde(rename = "DOTA_GAMERULES_STATE_HERO_SELECTION")]
    HeroSelection,
    #[serde(rename = "DOTA_GAMERULES_STATE_STRATEGY_TIME")]
    StrategyTime,
    #[serde(rename = "DOTA_GAMERULES_STATE_TEAM_SHOWCASE")]
    TeamShowcase,
    #[serde(rename = "DOTA_GAMERULES_STATE_WAIT_FOR_MAP_TO_LOAD")]
    WaitForMapToLoad,
    #[serde(rename = "DOTA_GAMERULES_STATE_PRE_GAME")]
    PreGame,
    #[serde(rename = "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS")]
    GameInProgress,
    #[serde(rename = "DOTA_GAMERULES_STATE_POST_GAME")]
    PostGame,
}

impl GameState {
    pub const ALL: [GameState; 8] = [
        GameState::WaitForPlayersToLoad,
        GameState::HeroSelection,
        GameState::StrategyTime,
        GameState::TeamShowcase,
        GameState::WaitForMapToLoad,
        GameState::PreGame,
        GameState::GameInProgress,
        GameState::PostGame,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameState::WaitForPlayersToLoad => "DOTA_GAMERULES_STATE_WAIT_FOR_PLAYERS_TO_LOAD",
            GameState::HeroSelection => "DOTA_GAMERULES_STATE_HERO_SELECTION",
            GameState::StrategyTime => "DOTA_GAMERULES_STATE_STRATEGY_TIME",
            GameState::TeamShowcase => "DOTA_GAMERULES_STATE_TEAM_SHOWCASE",
            GameState::WaitForMapToLoad => "DOTA_GAMERULES_STATE_WAIT_FOR_MAP_TO_LOAD",
            GameState::PreGame => "DOTA_GAMERULES_STATE_PRE_GAME",
            GameState::GameInProgress => "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS",
            GameState::PostGame => "DOTA_GAMERULES_STATE_POST_GAME",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    pub user: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoshanState {
    Alive,
    RespawnBase,
    RespawnVariable,
    Aegis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoshanStatus {
    pub state: RoshanState,
    /// Seconds left in the current state.
    pub remaining: f64,
}

/// Betting round snapshot. The layout belongs to the betting backend, so it
/// is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetRoundStats(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Chat {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: ChatLine,
    },
    #[serde(rename = "gamestate")]
    GameState {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: GameState,
    },
    Connected {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: bool,
    },
    Winner {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: bool,
    },
    Betting {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: BetRoundStats,
    },
    Roshan {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: RoshanStatus,
    },
    Pause {
        #[serde(default, skip_deserializing)]
        date: i64,
        value: bool,
    },
}

impl Message {
    pub fn chat(user: impl Into<String>, message: impl Into<String>) -> Self {
        Message::Chat {
            date: 0,
            value: ChatLine {
                user: user.into(),
                message: message.into(),
            },
        }
    }

    pub fn game_state(value: GameState) -> Self {
        Message::GameState { date: 0, value }
    }

    pub fn connected(value: bool) -> Self {
        Message::Connected { date: 0, value }
    }

    pub fn winner(value: bool) -> Self {
        Message::Winner { date: 0, value }
    }

    pub fn betting(value: serde_json::Value) -> Self {
        Message::Betting {
            date: 0,
            value: BetRoundStats(value),
        }
    }

    pub fn roshan(state: RoshanState, remaining: f64) -> Self {
        Message::Roshan {
            date: 0,
            value: RoshanStatus { state, remaining },
        }
    }

    pub fn pause(value: bool) -> Self {
        Message::Pause { date: 0, value }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Chat { .. } => MessageType::Chat,
            Message::GameState { .. } => MessageType::GameState,
            Message::Connected { .. } => MessageType::Connected,
            Message::Winner { .. } => MessageType::Winner,
            Message::Betting { .. } => MessageType::Betting,
            Message::Roshan { .. } => MessageType::Roshan,
            Message::Pause { .. } => MessageType::Pause,
        }
    }

    /// Local receipt time in Unix seconds, 0 until stamped.
    pub fn date(&self) -> i64 {
        match self {
            Message::Chat { date, .. }
            | Message::GameState { date, .. }
            | Message::Connected { date, .. }
            | Message::Winner { date, .. }
            | Message::Betting { date, .. }
            | Message::Roshan { date, .. }
            | Message::Pause { date, .. } => *date,
        }
    }

    pub fn with_date(mut self, stamp: i64) -> Self {
        match &mut self {
            Message::Chat { date, .. }
            | Message::GameState { date, .. }
            | Message::Connected { date, .. }
            | Message::Winner { date, .. }
            | Message::Betting { date, .. }
            | Message::Roshan { date, .. }
            | Message::Pause { date, .. } => *date = stamp,
        }
        self
    }

    pub fn as_chat(&self) -> Option<&ChatLine> {
        match self {
            Message::Chat { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_game_state(&self) -> Option<GameState> {
        match self {
            Message::GameState { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_connected(&self) -> Option<bool> {
        match self {
            Message::Connected { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_winner(&self) -> Option<bool> {
        match self {
            Message::Winner { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_betting(&self) -> Option<&BetRoundStats> {
        match self {
            Message::Betting { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_roshan(&self) -> Option<&RoshanStatus> {
        match self {
            Message::Roshan { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_pause(&self) -> Option<bool> {
        match self {
            Message::Pause { value, .. } => Some(*value),
            _ => None,
        }
    }
}

pub fn is_roshan_message(msg: &Message) -> bool {
    msg.message_type() == MessageType::Roshan
}

pub fn is_winner_message(msg: &Message) -> bool {
    msg.message_type() == MessageType::Winner
}

pub fn is_pause_message(msg: &Message) -> bool {
    msg.message_type() == MessageType::Pause
}

pub fn is_connected_message(msg: &Message) -> bool {
    msg.message_type() == MessageType::Connected
}

pub fn is_game_state_message(msg: &Message) -> bool {
    msg.message_type() == MessageType::GameState
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("frame has no string `type` tag")]
    MissingType,

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: MessageType,
        #[source]
        source: serde_json::Error,
    },
}

impl FrameError {
    pub fn kind(&self) -> String {
        match self {
            FrameError::NotJson(_) => "invalid-json".to_string(),
            FrameError::MissingType => "missing-type".to_string(),
            FrameError::UnknownType(tag) => tag.clone(),
            FrameError::MalformedPayload { kind, .. } => kind.to_string(),
        }
    }
}

pub fn frame_type(frame: &serde_json::Value) -> Option<MessageType> {
    frame.get("type")?.as_str()?.parse().ok()
}

pub fn decode_frame(text: &str) -> Result<Message, FrameError> {
    let raw: serde_json::Value = serde_json::from_str(text).map_err(FrameError::NotJson)?;
    let Some(kind) = frame_type(&raw) else {
        return Err(match raw.get("type").and_then(|t| t.as_str()) {
            Some(tag) => FrameError::UnknownType(tag.to_string()),
            None => FrameError::MissingType,
        });
    };
    serde_json::from_value(raw).map_err(|source| FrameError::MalformedPayload { kind, source })
}

pub fn encode_frame(msg: &Message) -> serde_json::Result<String> {
    serde_json::to_string(msg)
}
