//! Live channel binding: websocket frames in, store actions out.

use crate::error::{OverlayError, Result};
use crate::protocol::{Message, decode_frame};
use crate::state::{Action, new_message};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

/// Narrows one text frame to an action. Frames that fail to decode become
/// [`Action::Unrecognized`] so the store can drop them without interrupting
/// the session.
pub fn frame_to_action(text: &str) -> Action {
    match decode_frame(text) {
        Ok(message) => new_message(&message),
        Err(err) => {
            log::warn!("bad frame: {}", err);
            Action::Unrecognized { kind: err.kind() }
        }
    }
}

/// Opens the channel on a background task. The receiver yields
/// `connected(true)` once the socket is up, then one action per text frame,
/// then `connected(false)` when the socket ends for any reason.
pub fn spawn_channel(url: String) -> mpsc::UnboundedReceiver<Action> {
    let (tx, rx) = mpsc::unbounded_channel::<Action>();

    tokio::spawn(async move {
        if let Err(err) = channel_task(&url, &tx).await {
            log::warn!("live channel ended: {}", err);
        }
        let _ = tx.send(new_message(&Message::connected(false)));
    });

    rx
}

async fn channel_task(url: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
    let (mut ws_stream, _) = connect_async(url)
        .await
        .map_err(|source| OverlayError::Connect {
            url: url.to_string(),
            source,
        })?;
    log::info!("live channel open: {}", url);

    if tx.send(new_message(&Message::connected(true))).is_err() {
        return Ok(());
    }

    while let Some(msg_result) = ws_stream.next().await {
        let msg = msg_result?;
        if msg.is_close() {
            break;
        }
        if !msg.is_text() {
            continue;
        }
        let text = msg.into_text()?;
        if tx.send(frame_to_action(&text)).is_err() {
            // Session is gone; nothing left to deliver to.
            break;
        }
    }

    Ok(())
}
