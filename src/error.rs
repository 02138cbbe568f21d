//! Errors surfaced by the overlay runtime.
//!
//! None of these are fatal to an overlay: callers log them and render nothing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("preferences request failed: {0}")]
    Preferences(#[from] reqwest::Error),

    #[error("failed connecting to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("channel error: {0}")]
    Channel(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
