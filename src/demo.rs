//! Scripted live feed for overlay testing.
//!
//! Serves both live channels and the preferences endpoint so an overlay can
//! run end to end without the production backend.

use crate::gate::Preferences;
use crate::preferences::PREFERENCES_PATH;
use crate::protocol::{GameState, Message, RoshanState, encode_frame};
use axum::{
    Json, Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::json;
use std::time::Duration;

#[derive(Clone, Copy)]
struct FeedConfig {
    interval: Duration,
}

pub fn router(interval: Duration) -> Router {
    Router::new()
        .route("/dota-gsi/live/{auth}", get(game_feed_handler))
        .route("/bets/live/{auth}", get(betting_feed_handler))
        .route(PREFERENCES_PATH, get(preferences_handler))
        .with_state(FeedConfig { interval })
}

pub async fn run_demo(bind_addr: String, interval: Duration) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("demo feed listening on {}", bind_addr);
    axum::serve(listener, router(interval)).await?;
    Ok(())
}

/// One scripted match, in the order a real game reports it.
pub fn match_script() -> Vec<Message> {
    vec![
        Message::game_state(GameState::WaitForPlayersToLoad),
        Message::game_state(GameState::HeroSelection),
        Message::game_state(GameState::StrategyTime),
        Message::game_state(GameState::TeamShowcase),
        Message::game_state(GameState::WaitForMapToLoad),
        Message::game_state(GameState::PreGame),
        Message::roshan(RoshanState::Alive, 0.0),
        Message::game_state(GameState::GameInProgress),
        Message::pause(true),
        Message::chat("caster", "technical pause"),
        Message::pause(false),
        Message::roshan(RoshanState::Aegis, 300.0),
        Message::roshan(RoshanState::RespawnBase, 180.0),
        Message::roshan(RoshanState::RespawnVariable, 180.0),
        Message::roshan(RoshanState::Alive, 0.0),
        Message::game_state(GameState::PostGame),
        Message::winner(true),
    ]
}

fn betting_snapshot() -> Message {
    let mut rng = rand::thread_rng();
    let radiant: u32 = rng.gen_range(0..500);
    let dire: u32 = rng.gen_range(0..500);
    Message::betting(json!({
        "status": "betting",
        "total": radiant + dire,
        "aBets": radiant,
        "bBets": dire,
    }))
}

/// Encodes a message the way the backend sends it: without a `date`.
pub fn sender_frame(msg: &Message) -> serde_json::Result<String> {
    let mut raw: serde_json::Value = serde_json::from_str(&encode_frame(msg)?)?;
    if let Some(obj) = raw.as_object_mut() {
        obj.remove("date");
    }
    serde_json::to_string(&raw)
}

async fn preferences_handler() -> impl IntoResponse {
    Json(Preferences::all_enabled())
}

async fn game_feed_handler(
    ws: WebSocketUpgrade,
    Path(auth): Path<String>,
    State(config): State<FeedConfig>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, auth, config, Feed::Game))
}

async fn betting_feed_handler(
    ws: WebSocketUpgrade,
    Path(auth): Path<String>,
    State(config): State<FeedConfig>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, auth, config, Feed::Betting))
}

#[derive(Debug, Clone, Copy)]
enum Feed {
    Game,
    Betting,
}

async fn handle_socket(socket: WebSocket, auth: String, config: FeedConfig, feed: Feed) {
    log::info!("{:?} feed subscribed for {}", feed, auth);
    if let Err(err) = handle_socket_inner(socket, config, feed).await {
        log::warn!("websocket connection ended: {}", err);
    }
}

async fn handle_socket_inner(
    socket: WebSocket,
    config: FeedConfig,
    feed: Feed,
) -> anyhow::Result<()> {
    let (mut ws_write, mut ws_read) = socket.split();
    let script = match_script();
    let mut step = 0usize;
    let mut ticker = tokio::time::interval(config.interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let msg = match feed {
                    Feed::Game => script[step % script.len()].clone(),
                    Feed::Betting => betting_snapshot(),
                };
                step += 1;
                let encoded = match sender_frame(&msg) {
                    Ok(s) => s,
                    Err(e) => {
                        log::error!("failed encoding demo frame: {}", e);
                        continue;
                    }
                };
                ws_write.send(WsMessage::Text(encoded.into())).await?;
            }
            incoming = ws_read.next() => {
                match incoming {
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        log::warn!("websocket read error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_frame;

    #[test]
    fn sender_frames_carry_no_date() {
        let frame = sender_frame(&Message::winner(true).with_date(99)).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert!(raw.get("date").is_none());
        assert_eq!(decode_frame(&frame).unwrap(), Message::winner(true));
    }

    #[test]
    fn script_ends_with_a_winner() {
        let script = match_script();
        assert_eq!(
            script.first().and_then(|m| m.as_game_state()),
            Some(GameState::WaitForPlayersToLoad)
        );
        assert_eq!(script.last().and_then(|m| m.as_winner()), Some(true));
    }

    #[test]
    fn betting_snapshot_totals_add_up() {
        let msg = betting_snapshot();
        let stats = &msg.as_betting().unwrap().0;
        assert_eq!(
            stats["total"].as_u64().unwrap(),
            stats["aBets"].as_u64().unwrap() + stats["bBets"].as_u64().unwrap()
        );
    }
}
