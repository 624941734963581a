use parley_types::{Chat, ChatMessage, Role, PLACEHOLDER_TITLE};
use serde::{Deserialize, Serialize};

/// Persisted chat document: one document per chat, keyed by chat id and
/// scoped by user id.
///
/// Field defaults tolerate partial documents created by a merge-write
/// landing before the full upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default = "bson::DateTime::now")]
    pub updated_at: bson::DateTime,
}

fn default_title() -> String {
    PLACEHOLDER_TITLE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl From<&ChatMessage> for StoredMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            role: message.role,
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

impl From<StoredMessage> for ChatMessage {
    fn from(stored: StoredMessage) -> Self {
        Self {
            id: stored.id,
            role: stored.role,
            content: stored.content,
            timestamp: stored.timestamp,
        }
    }
}

impl ChatDocument {
    pub fn from_chat(user_id: &str, chat: &Chat) -> Self {
        Self {
            id: chat.id.clone(),
            user_id: user_id.to_string(),
            title: chat.title.clone(),
            messages: chat.messages.iter().map(StoredMessage::from).collect(),
            created_at: chat.created_at,
            updated_at: bson::DateTime::now(),
        }
    }

    pub fn into_chat(self) -> Chat {
        Chat {
            id: self.id,
            title: self.title,
            messages: self.messages.into_iter().map(ChatMessage::from).collect(),
            created_at: self.created_at,
        }
    }
}
