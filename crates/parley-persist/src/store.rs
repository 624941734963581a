use async_trait::async_trait;
use parley_types::{Chat, ChatMessage};

use crate::error::Result;

/// Trait for the remote chat-document store.
///
/// Every write is a merge-upsert: it creates the target document when
/// absent and otherwise updates only the named fields, so a write can
/// never fail merely because the document does not exist yet. Local state
/// is optimistic and may race the network; merge-writes remove the whole
/// "not found on update" failure class.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Fetch all chats for a user, ordered by creation time descending.
    async fn load_chats(&self, user_id: &str) -> Result<Vec<Chat>>;

    /// Merge-upsert a full chat document.
    async fn upsert_chat(&self, user_id: &str, chat: &Chat) -> Result<()>;

    /// Merge-write of the `messages` field only; create-on-write.
    async fn update_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[ChatMessage],
    ) -> Result<()>;

    /// Merge-write of the `title` field only; create-on-write.
    async fn update_title(&self, user_id: &str, chat_id: &str, title: &str) -> Result<()>;

    /// Delete the chat document. Deleting a non-existent document is not
    /// an error.
    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<()>;
}
