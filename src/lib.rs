//! Live broadcast overlay feed.
//!
//! Overlays subscribe to a live channel, narrow each frame to a typed
//! [`protocol::Message`] and fold it into a receipt-ordered [`state::State`]
//! that the renderer reads. A per-overlay [`gate`] decides from the
//! streamer's preferences whether the channel is opened at all.

pub mod channel;
pub mod config;
pub mod demo;
pub mod error;
pub mod gate;
pub mod preferences;
pub mod protocol;
pub mod session;
pub mod state;
pub mod view;

pub use error::{OverlayError, Result};
pub use gate::{Capability, ChannelKind, Overlay, Preferences, gate, gate_by_name};
pub use protocol::{
    BetRoundStats, ChatLine, FrameError, GameState, Message, MessageType, RoshanState,
    RoshanStatus, decode_frame, is_connected_message, is_game_state_message, is_pause_message,
    is_roshan_message, is_winner_message,
};
pub use session::{Session, SessionOutcome};
pub use state::{Action, Retention, State, Store, new_message, transition};
pub use view::OverlayView;
