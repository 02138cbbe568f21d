//! One overlay session: gate, channel, store and the published view.

use crate::channel::spawn_channel;
use crate::config::WatchArgs;
use crate::preferences::{PreferencesState, fetch_preferences};
use crate::state::{Action, Retention, State, Store};
use crate::view::OverlayView;
use std::future::Future;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Preferences did not enable the overlay; no channel was opened.
    GateClosed,
    /// The channel stopped delivering actions.
    ChannelEnded,
    /// The session was torn down from outside.
    Shutdown,
}

pub struct Session {
    store: Store,
    state_tx: watch::Sender<State>,
}

impl Session {
    pub fn new(retention: Retention) -> (Self, watch::Receiver<State>) {
        let (state_tx, state_rx) = watch::channel(State::new());
        (
            Self {
                store: Store::new(retention),
                state_tx,
            },
            state_rx,
        )
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = self.store.dispatch(action).clone();
        self.state_tx.send_if_modified(|current| {
            if current.same_as(&state) {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    /// Folds actions one at a time until the channel closes or `shutdown`
    /// resolves. Undelivered actions are dropped with the session.
    pub async fn run<F>(
        mut self,
        mut actions: mpsc::UnboundedReceiver<Action>,
        shutdown: F,
    ) -> (SessionOutcome, State)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => break SessionOutcome::Shutdown,
                next = actions.recv() => match next {
                    Some(action) => self.dispatch(action),
                    None => break SessionOutcome::ChannelEnded,
                },
            }
        };
        let (dispatched, ignored) = self.store.counters();
        log::info!(
            "session finished: {:?} ({} actions, {} dropped)",
            outcome,
            dispatched,
            ignored
        );
        (outcome, self.store.state().clone())
    }
}

/// Runs a complete overlay session for the command line.
pub async fn run_overlay<F>(args: &WatchArgs, shutdown: F) -> anyhow::Result<SessionOutcome>
where
    F: Future<Output = ()>,
{
    let preferences = match args.overlay.capability() {
        Some(_) => {
            let client = reqwest::Client::new();
            PreferencesState::from_result(
                fetch_preferences(&client, &args.api_base, &args.auth).await,
            )
        }
        None => PreferencesState::Pending,
    };

    if !args.overlay.may_open(preferences.as_loaded()) {
        log::info!("{:?} overlay disabled, not opening a channel", args.overlay);
        return Ok(SessionOutcome::GateClosed);
    }

    let url = args.overlay.channel().url(&args.ws_base, &args.auth);
    let actions = spawn_channel(url);
    let (session, mut state_rx) = Session::new(args.retention());

    let renderer = tokio::spawn(async move {
        let mut last = OverlayView::default();
        while state_rx.changed().await.is_ok() {
            let view = OverlayView::from_state(&state_rx.borrow_and_update());
            if view != last {
                log::info!("{}", view);
                last = view;
            }
        }
    });

    let (outcome, _) = session.run(actions, shutdown).await;
    renderer.abort();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{GameState, Message, MessageType, RoshanState};
    use crate::state::new_message;

    #[tokio::test]
    async fn session_folds_in_receipt_order() {
        let (session, state_rx) = Session::new(Retention::Unbounded);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(new_message(&Message::game_state(GameState::PreGame))).unwrap();
        tx.send(Action::Unrecognized {
            kind: "killfeed".to_string(),
        })
        .unwrap();
        tx.send(new_message(&Message::roshan(RoshanState::Alive, 0.0))).unwrap();
        tx.send(new_message(&Message::winner(true))).unwrap();
        drop(tx);

        let (outcome, state) = session.run(rx, std::future::pending()).await;

        assert_eq!(outcome, SessionOutcome::ChannelEnded);
        let kinds: Vec<_> = state.messages().iter().map(|m| m.message_type()).collect();
        assert_eq!(
            kinds,
            vec![MessageType::GameState, MessageType::Roshan, MessageType::Winner]
        );
        assert!(state.messages().windows(2).all(|w| w[0].date() <= w[1].date()));
        assert_eq!(*state_rx.borrow(), state);
    }

    #[tokio::test]
    async fn shutdown_discards_pending_actions() {
        let (session, _state_rx) = Session::new(Retention::Unbounded);
        let (_tx, rx) = mpsc::unbounded_channel();

        let (outcome, state) = session.run(rx, async {}).await;

        assert_eq!(outcome, SessionOutcome::Shutdown);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn closed_gate_never_opens_a_channel() {
        let args = WatchArgs {
            overlay: crate::gate::Overlay::VoteToplist,
            auth: "tok".to_string(),
            // Nothing listens here; the fetch fails and the gate stays closed.
            ws_base: "ws://127.0.0.1:9".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            max_messages: None,
            latest_only: false,
        };

        let outcome = run_overlay(&args, std::future::pending()).await.unwrap();
        assert_eq!(outcome, SessionOutcome::GateClosed);
    }
}
