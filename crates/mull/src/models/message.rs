use serde::{Deserialize, Serialize};

use super::frame::Fragment;

/// Appended to an assistant message when its turn failed after it was submitted
pub const ERROR_MARKER: &str = "\n\n[Error: the response could not be completed]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A transcript entry, including the thinking trace the model produced for it
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

impl Message {
    /// Create a user message with the given text
    pub fn user<S: Into<String>>(text: S) -> Self {
        Message {
            role: Role::User,
            content: text.into(),
            thinking: None,
        }
    }

    /// Create an empty assistant message, used as the draft of a streaming turn
    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            content: String::new(),
            thinking: None,
        }
    }

    /// Add text content to the message
    pub fn with_text<S: AsRef<str>>(mut self, text: S) -> Self {
        self.content.push_str(text.as_ref());
        self
    }

    /// Return a new message with the fragment's fields appended to the running strings
    pub fn with_fragment(&self, fragment: &Fragment) -> Self {
        let mut next = self.clone();
        if let Some(thinking) = &fragment.thinking {
            next.thinking
                .get_or_insert_with(String::new)
                .push_str(thinking);
        }
        if let Some(content) = &fragment.content {
            next.content.push_str(content);
        }
        next
    }

    /// True when neither channel has received any text
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.thinking.as_deref().map_or(true, str::is_empty)
    }

    /// The form sent upstream. The thinking trace is generation output, not history,
    /// so it is dropped here, and so is the error marker of a failed turn.
    pub fn to_chat_message(&self) -> ChatMessage {
        let content = match self.role {
            Role::Assistant => self.content.strip_suffix(ERROR_MARKER).unwrap_or(&self.content),
            Role::User => &self.content,
        };
        ChatMessage {
            role: self.role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: &[Message], model: Option<String>) -> Self {
        Self {
            messages: messages
                .iter()
                .map(Message::to_chat_message)
                // A turn that failed before producing any text has nothing to contribute
                .filter(|m| m.role == Role::User || !m.content.is_empty())
                .collect(),
            model,
        }
    }
}
