//! Bounded conversation history.
//!
//! Keeps the most recent `max_turns` turns of a conversation, oldest first.
//! The bound counts individual turns, so a window of 10 holds the last five
//! exchanges.

use std::collections::VecDeque;

use cardchat_core::message::Message;

/// Default number of turns kept as context.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Upper limit on the up-front reservation; larger windows grow on demand.
const PREALLOCATED_TURNS: usize = 64;

/// An ordered, bounded buffer of user and assistant turns.
///
/// Invariant: `len() <= max_turns()` after every public operation.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    turns: VecDeque<Message>,
    max_turns: usize,
}

impl HistoryStore {
    /// Create an empty store. `max_turns == 0` keeps nothing.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns.min(PREALLOCATED_TURNS) + 2),
            max_turns,
        }
    }

    /// The configured bound.
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Current history in conversational order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.turns.iter().cloned().collect()
    }

    /// Record one exchange: the user turn, then the assistant turn.
    pub fn append(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.turns.push_back(Message::user(user_text));
        self.turns.push_back(Message::assistant(assistant_text));
        self.truncate();
    }

    /// Drop the oldest turns until at most `max_turns` remain.
    ///
    /// Returns how many turns were discarded.
    pub fn truncate(&mut self) -> usize {
        let excess = self.turns.len().saturating_sub(self.max_turns);
        self.turns.drain(..excess);
        excess
    }

    /// Forget everything (interactive `/reset`).
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}
