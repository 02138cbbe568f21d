//! Overlay state and the transition function that folds live messages into it.

use crate::protocol::{Message, MessageType};
use std::collections::HashSet;
use std::sync::Arc;

/// Receipt-ordered message log for one overlay session.
///
/// Cloning is cheap and shares the log; a transition never writes into a log
/// that another holder can see.
#[derive(Debug, Clone, Default)]
pub struct State {
    messages: Arc<Vec<Message>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn latest(&self, kind: MessageType) -> Option<&Message> {
        self.latest_where(|m| m.message_type() == kind)
    }

    pub fn latest_where<F>(&self, mut predicate: F) -> Option<&Message>
    where
        F: FnMut(&Message) -> bool,
    {
        self.messages.iter().rev().find(|m| predicate(*m))
    }

    pub fn same_as(&self, other: &State) -> bool {
        Arc::ptr_eq(&self.messages, &other.messages)
    }

    fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(messages),
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.messages == other.messages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NewMessage(Message),
    /// A frame that could not be narrowed to a message. The store ignores it.
    Unrecognized { kind: String },
}

impl Action {
    pub fn kind(&self) -> &str {
        match self {
            Action::NewMessage(_) => "new-message",
            Action::Unrecognized { kind } => kind.as_str(),
        }
    }
}

pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Wraps a copy of `message`, stamped with the current time, in a new-message action.
pub fn new_message(message: &Message) -> Action {
    new_message_at(message, now_unix())
}

pub fn new_message_at(message: &Message, date: i64) -> Action {
    Action::NewMessage(message.clone().with_date(date))
}

pub fn transition(state: &State, action: &Action) -> State {
    match action {
        Action::NewMessage(message) => {
            let mut messages = Vec::with_capacity(state.len() + 1);
            messages.extend_from_slice(state.messages());
            messages.push(message.clone());
            State::from_messages(messages)
        }
        Action::Unrecognized { .. } => state.clone(),
    }
}

/// How much of the log a [`Store`] keeps after each dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    #[default]
    Unbounded,
    /// Keep only the newest `n` messages.
    MaxMessages(usize),
    /// Keep only the newest message of each variant, in receipt order.
    LatestPerType,
}

impl Retention {
    pub fn apply(self, state: State) -> State {
        match self {
            Retention::Unbounded => state,
            Retention::MaxMessages(cap) => {
                if state.len() <= cap {
                    return state;
                }
                let skip = state.len() - cap;
                State::from_messages(state.messages()[skip..].to_vec())
            }
            Retention::LatestPerType => {
                let mut seen = HashSet::new();
                let mut kept: Vec<Message> = state
                    .messages()
                    .iter()
                    .rev()
                    .filter(|m| seen.insert(m.message_type()))
                    .cloned()
                    .collect();
                if kept.len() == state.len() {
                    return state;
                }
                kept.reverse();
                State::from_messages(kept)
            }
        }
    }
}

/// Single owner of an overlay session's state.
#[derive(Debug, Default)]
pub struct Store {
    state: State,
    retention: Retention,
    dispatched: u64,
    ignored: u64,
}

impl Store {
    pub fn new(retention: Retention) -> Self {
        Self {
            retention,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// (dispatched, ignored)
    pub fn counters(&self) -> (u64, u64) {
        (self.dispatched, self.ignored)
    }

    pub fn dispatch(&mut self, action: Action) -> &State {
        self.dispatched += 1;
        let next = transition(&self.state, &action);
        if next.same_as(&self.state) {
            self.ignored += 1;
            log::warn!("dropping unrecognized action: {}", action.kind());
        } else {
            log::debug!(
                "dispatched {} (log length {})",
                action.kind(),
                next.len()
            );
            self.state = self.retention.apply(next);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{GameState, RoshanState};
    use proptest::prelude::*;

    #[test]
    fn new_message_stamps_a_copy() {
        let original = Message::winner(true).with_date(7);
        let before = now_unix();
        let action = new_message(&original);

        assert_eq!(original.date(), 7);
        let Action::NewMessage(stamped) = &action else {
            panic!("expected new-message action");
        };
        assert!(stamped.date() >= before);
        assert_eq!(stamped.as_winner(), Some(true));
    }

    #[test]
    fn repeated_new_message_produces_independent_actions() {
        let literal = Message::pause(false);
        let first_call = now_unix();
        let a = new_message(&literal);
        let b = new_message(&literal);

        assert_eq!(literal.date(), 0);
        for action in [a, b] {
            let Action::NewMessage(msg) = action else {
                panic!("expected new-message action");
            };
            assert!(msg.date() >= first_call);
        }
    }

    #[test]
    fn transition_appends_single_message() {
        let msg = Message::roshan(RoshanState::Aegis, 300.0);
        let action = new_message_at(&msg, 1_600_000_000);
        let next = transition(&State::new(), &action);

        assert_eq!(next.messages(), &[msg.with_date(1_600_000_000)]);
    }

    #[test]
    fn transition_leaves_previous_state_untouched() {
        let first = transition(&State::new(), &new_message(&Message::connected(true)));
        let second = transition(&first, &new_message(&Message::pause(true)));

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(first.messages()[0], second.messages()[0]);
    }

    #[test]
    fn unrecognized_action_is_identity() {
        let state = transition(&State::new(), &new_message(&Message::winner(false)));
        let next = transition(
            &state,
            &Action::Unrecognized {
                kind: "killfeed".to_string(),
            },
        );

        assert!(next.same_as(&state));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn latest_picks_newest_of_variant() {
        let mut state = State::new();
        for msg in [
            Message::game_state(GameState::HeroSelection),
            Message::pause(true),
            Message::game_state(GameState::GameInProgress),
            Message::pause(false),
        ] {
            state = transition(&state, &new_message(&msg));
        }

        let latest = state.latest(MessageType::GameState).unwrap();
        assert_eq!(latest.as_game_state(), Some(GameState::GameInProgress));
        assert!(state.latest(MessageType::Chat).is_none());
    }

    #[test]
    fn max_messages_retention_keeps_tail() {
        let mut store = Store::new(Retention::MaxMessages(2));
        for i in 0..5 {
            store.dispatch(new_message(&Message::chat("u", i.to_string())));
        }
        let lines: Vec<_> = store
            .state()
            .messages()
            .iter()
            .filter_map(|m| m.as_chat().map(|c| c.message.clone()))
            .collect();
        assert_eq!(lines, vec!["3", "4"]);
    }

    #[test]
    fn latest_per_type_retention_keeps_receipt_order() {
        let mut store = Store::new(Retention::LatestPerType);
        store.dispatch(new_message(&Message::pause(true)));
        store.dispatch(new_message(&Message::winner(true)));
        store.dispatch(new_message(&Message::pause(false)));

        let kinds: Vec<_> = store
            .state()
            .messages()
            .iter()
            .map(|m| m.message_type())
            .collect();
        assert_eq!(kinds, vec![MessageType::Winner, MessageType::Pause]);
        assert_eq!(
            store.state().latest(MessageType::Pause).unwrap().as_pause(),
            Some(false)
        );
    }

    #[test]
    fn store_counts_ignored_actions() {
        let mut store = Store::new(Retention::Unbounded);
        store.dispatch(new_message(&Message::connected(true)));
        store.dispatch(Action::Unrecognized {
            kind: "invalid-json".to_string(),
        });

        assert_eq!(store.counters(), (2, 1));
        assert_eq!(store.state().len(), 1);
    }

    fn arb_message() -> impl Strategy<Value = Message> {
        prop_oneof![
            (any::<bool>()).prop_map(Message::winner),
            (any::<bool>()).prop_map(Message::pause),
            (any::<bool>()).prop_map(Message::connected),
            (0usize..8).prop_map(|i| Message::game_state(GameState::ALL[i])),
            ("[a-z]{1,8}", ".{0,16}").prop_map(|(u, m)| Message::chat(u, m)),
            (0.0f64..480.0).prop_map(|r| Message::roshan(RoshanState::RespawnBase, r)),
        ]
    }

    proptest! {
        #[test]
        fn appends_preserve_dispatch_order(msgs in prop::collection::vec(arb_message(), 0..64)) {
            let mut store = Store::new(Retention::Unbounded);
            for msg in &msgs {
                // Same stamp for every message: order must come from dispatch alone.
                store.dispatch(new_message_at(msg, 1_000));
            }

            let state = store.state();
            prop_assert_eq!(state.len(), msgs.len());
            for (stored, sent) in state.messages().iter().zip(&msgs) {
                prop_assert_eq!(stored, &sent.clone().with_date(1_000));
            }
        }
    }
}
