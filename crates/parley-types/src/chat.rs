use serde::{Deserialize, Serialize};

use crate::message::{now_millis, ChatMessage, Role};

/// Title a chat carries until its first completed model response.
pub const PLACEHOLDER_TITLE: &str = "New Session";

/// Maximum length of a derived title, in characters.
pub const TITLE_MAX_CHARS: usize = 40;

/// One conversation thread: an ordered list of messages plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    /// Conversation order, oldest first. Append-only in normal operation.
    pub messages: Vec<ChatMessage>,
    /// Epoch milliseconds, immutable after construction.
    pub created_at: i64,
}

impl Chat {
    /// Create an empty chat with the placeholder title.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now_millis(),
        }
    }

    /// True until the title has been derived from the first user message.
    pub fn has_placeholder_title(&self) -> bool {
        self.title == PLACEHOLDER_TITLE
    }

    pub fn first_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.role == Role::User)
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a chat title from the first user message: the first
/// [`TITLE_MAX_CHARS`] characters, with `…` appended when truncated.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{title}…")
    } else {
        title
    }
}
