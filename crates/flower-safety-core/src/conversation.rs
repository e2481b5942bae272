use chrono::{DateTime, Local};

use crate::state::{Message, GREETING};

/// Append-only, in-memory message history for one session
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation seeded with the bot greeting
    pub fn new(greeted_at: DateTime<Local>) -> Self {
        Self {
            messages: vec![Message::bot(GREETING, greeted_at)],
        }
    }

    /// Add a message to the end. The only way to change the history.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
