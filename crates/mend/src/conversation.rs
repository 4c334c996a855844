use crate::models::message::Message;

pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded, ordered dialogue history for a single session.
///
/// The opening statement is never stored here; it is synthesized from
/// configuration and prepended when a request is built. Eviction is FIFO:
/// once the cap is exceeded the oldest turn is dropped, whichever role it
/// belongs to.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    capacity: usize,
}

impl Conversation {
    pub fn new(capacity: usize) -> Self {
        Conversation {
            messages: Vec::new(),
            capacity,
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.evict_if_over_capacity();
    }

    /// The most recent `limit` turns, oldest-to-newest.
    pub fn snapshot(&self, limit: usize) -> Vec<Message> {
        let start = self.messages.len().saturating_sub(limit);
        self.messages[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_if_over_capacity(&mut self) {
        while self.messages.len() > self.capacity {
            self.messages.remove(0);
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
