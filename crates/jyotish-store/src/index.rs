use std::collections::HashMap;

use jyotish_types::{Message, MessageId};

/// Lookup from message id to display position.
///
/// Messages are only ever appended, so the store extends the index in place
/// on every send instead of rebuilding it; `build` gives the same result from
/// scratch.
#[derive(Debug, Clone, Default)]
pub struct ThreadIndex {
    positions: HashMap<MessageId, usize>,
}

impl ThreadIndex {
    pub fn build(messages: &[Message]) -> Self {
        let mut index = Self {
            positions: HashMap::with_capacity(messages.len()),
        };
        for (position, message) in messages.iter().enumerate() {
            index.insert(message.id.clone(), position);
        }
        index
    }

    /// Record `id` at `position`. The first position recorded for an id wins;
    /// returns false if the id was already present.
    pub fn insert(&mut self, id: MessageId, position: usize) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, position);
        true
    }

    pub fn position(&self, id: &MessageId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Resolve `id` against `messages`. Unknown ids and positions that do
    /// not match the slice resolve to `None`, never panic.
    pub fn resolve<'a>(&self, messages: &'a [Message], id: &MessageId) -> Option<&'a Message> {
        let position = self.position(id)?;
        messages.get(position).filter(|message| &message.id == id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
