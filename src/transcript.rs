//! Session transcript types
//!
//! Messages live only in memory for the lifetime of the session; nothing
//! here is written to disk.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single message in the chat transcript
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Author::User)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Author::Assistant)
    }

    fn new(text: impl Into<String>, author: Author) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            author,
            created_at: Utc::now(),
        }
    }
}

impl Author {
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "You",
            Author::Assistant => "Assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_get_unique_ids() {
        let a = ChatMessage::user("hello");
        let b = ChatMessage::user("hello");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn author_labels() {
        assert_eq!(Author::User.label(), "You");
        assert_eq!(Author::Assistant.label(), "Assistant");
    }
}
