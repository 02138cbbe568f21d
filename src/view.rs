use crate::protocol::{BetRoundStats, ChatLine, GameState, MessageType, RoshanStatus};
use crate::state::State;
use std::fmt;

const CHAT_LINES: usize = 5;

/// What an overlay draws: the latest value of every variant it cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayView {
    pub connected: bool,
    pub game_state: Option<GameState>,
    pub roshan: Option<RoshanStatus>,
    pub paused: bool,
    pub winner: Option<bool>,
    pub betting: Option<BetRoundStats>,
    pub recent_chat: Vec<ChatLine>,
}

impl OverlayView {
    pub fn from_state(state: &State) -> Self {
        let mut recent_chat: Vec<ChatLine> = state
            .messages()
            .iter()
            .rev()
            .filter_map(|m| m.as_chat().cloned())
            .take(CHAT_LINES)
            .collect();
        recent_chat.reverse();

        Self {
            connected: state
                .latest(MessageType::Connected)
                .and_then(|m| m.as_connected())
                .unwrap_or(false),
            game_state: state
                .latest(MessageType::GameState)
                .and_then(|m| m.as_game_state()),
            roshan: state
                .latest(MessageType::Roshan)
                .and_then(|m| m.as_roshan().copied()),
            paused: state
                .latest(MessageType::Pause)
                .and_then(|m| m.as_pause())
                .unwrap_or(false),
            winner: state
                .latest(MessageType::Winner)
                .and_then(|m| m.as_winner()),
            betting: state
                .latest(MessageType::Betting)
                .and_then(|m| m.as_betting().cloned()),
            recent_chat,
        }
    }
}

impl fmt::Display for OverlayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "connected={} phase={} paused={}",
            self.connected,
            self.game_state.map_or("-", |g| g.as_str()),
            self.paused
        )?;
        if let Some(roshan) = &self.roshan {
            write!(f, " roshan={:?}({:.0}s)", roshan.state, roshan.remaining)?;
        }
        if let Some(winner) = self.winner {
            write!(f, " winner={}", if winner { "radiant" } else { "dire" })?;
        }
        if let Some(betting) = &self.betting {
            write!(f, " betting={}", betting.0)?;
        }
        if let Some(last) = self.recent_chat.last() {
            write!(f, " chat=<{}> {}", last.user, last.message)?;
        }
        Ok(())
    }
}
