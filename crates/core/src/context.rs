//! Rolling context buffer
//!
//! An ordered, capped log of recent turns used to give the language model
//! short-term memory. Appending past the capacity evicts the oldest turn, so the
//! buffer always holds the most recent turns in chronological order.

use std::collections::VecDeque;

use crate::conversation::{Turn, TurnRole};

/// Default number of turns kept in the window
pub const DEFAULT_MAX_TURNS: usize = 8;

/// Capped FIFO window of conversation turns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBuffer {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl Default for ContextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuffer {
    /// Create an empty buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_TURNS)
    }

    /// Create an empty buffer holding at most `max_turns` turns
    ///
    /// The capacity is clamped to `1..=DEFAULT_MAX_TURNS`.
    pub fn with_capacity(max_turns: usize) -> Self {
        let max_turns = max_turns.clamp(1, DEFAULT_MAX_TURNS);
        Self {
            turns: VecDeque::with_capacity(max_turns + 1),
            max_turns,
        }
    }

    /// Rebuild a buffer from previously serialized turns
    ///
    /// Blank turns are dropped and only the most recent `max_turns` are kept.
    pub fn from_turns(turns: impl IntoIterator<Item = Turn>, max_turns: usize) -> Self {
        let mut buffer = Self::with_capacity(max_turns);
        for turn in turns {
            buffer.push(turn);
        }
        buffer
    }

    /// Append a turn, evicting the oldest when over capacity
    ///
    /// Returns `false` (and leaves the buffer untouched) when `text` is blank.
    pub fn append(&mut self, role: TurnRole, text: impl Into<String>) -> bool {
        self.push(Turn::new(role, text))
    }

    /// Append an existing turn with the same rules as [`ContextBuffer::append`]
    pub fn push(&mut self, turn: Turn) -> bool {
        if turn.text().trim().is_empty() {
            return false;
        }

        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            if let Some(evicted) = self.turns.pop_front() {
                tracing::trace!(role = %evicted.role(), "Evicted oldest turn from context");
            }
        }
        true
    }

    /// Remove every turn
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Ordered copy of the turns, oldest first
    pub fn serialize(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Iterate turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}
