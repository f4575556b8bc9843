//! Append-only transcript shared by the controllers and the UI

use std::sync::{Arc, PoisonError, RwLock};

use crate::state::Message;

/// Ordered log of every transcript entry.
///
/// Cloning the store clones the handle, not the log: every clone appends to
/// and reads from the same sequence. Insertion order is display order and an
/// entry keeps its position forever.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: Message) {
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Owned copy of the transcript as it is right now
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
