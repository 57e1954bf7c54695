//! Client copy of the conversation context
//!
//! Persisted after every change as a JSON array of turns under one key. It is
//! independent of the server copy and may diverge from it.

use std::sync::Arc;

use voice_avatar_core::{ContextBuffer, Turn, TurnRole};

use crate::storage::KeyValueStore;
use crate::ClientError;

pub struct LocalContext {
    buffer: ContextBuffer,
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalContext {
    /// Load the context stored under `key`
    ///
    /// Missing or unreadable data starts an empty context.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, max_turns: usize) -> Self {
        let key = key.into();

        let turns = match store.load(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Turn>>(&raw) {
                Ok(turns) => turns,
                Err(e) => {
                    tracing::warn!(key = %key, "Discarding unreadable local context: {}", e);
                    Vec::new()
                },
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, "Failed to load local context: {}", e);
                Vec::new()
            },
        };

        Self {
            buffer: ContextBuffer::from_turns(turns, max_turns),
            store,
            key,
        }
    }

    /// Append a turn and persist
    ///
    /// Blank text changes nothing and writes nothing.
    pub fn append(&mut self, role: TurnRole, text: &str) -> Result<bool, ClientError> {
        if !self.buffer.append(role, text) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Empty the context and drop the stored copy
    pub fn reset(&mut self) -> Result<(), ClientError> {
        self.buffer.reset();
        self.store.remove(&self.key)
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.buffer.serialize()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn persist(&self) -> Result<(), ClientError> {
        let raw = serde_json::to_string(&self.buffer.serialize())
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        self.store.save(&self.key, &raw)
    }
}
