//! UI-agnostic conversation state
//!
//! These types are shared between the core routing logic and whatever
//! presentation layer renders the thread. They don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Greeting seeded as the first assistant message of every conversation.
pub const GREETING: &str = "Hello there!👋 I am StarterSupport, here to answer questions you may have regarding the product or your order.";

/// A chat message in the support conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Name shown next to the message in the thread
    pub fn display_name(&self) -> &'static str {
        match self {
            ChatRole::Assistant => "StarterSupport",
            ChatRole::User => "User",
        }
    }
}

/// Append-only, ordered message log. Position is the only identity a message has.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// A fresh conversation holding only the greeting
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn append(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        // just pushed
        &self.messages[self.messages.len() - 1]
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_seeded_with_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.all()[0], ChatMessage::assistant(GREETING));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new();
        conversation.append(ChatMessage::user("hi"));
        conversation.append(ChatMessage::assistant("hello"));

        let contents: Vec<&str> = conversation.all().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![GREETING, "hi", "hello"]);
        assert_eq!(conversation.last().map(|m| m.role), Some(ChatRole::Assistant));
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("where is my parcel")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"where is my parcel"}"#);

        let parsed: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
        assert_eq!(parsed.role, ChatRole::Assistant);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ChatRole::Assistant.display_name(), "StarterSupport");
        assert_eq!(ChatRole::User.display_name(), "User");
    }
}
