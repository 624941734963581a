//! In-memory chat store backend.
//! Same merge-upsert semantics as the document store; useful for tests
//! and embedding without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use parley_types::{Chat, ChatMessage, PLACEHOLDER_TITLE};

use crate::error::Result;
use crate::store::ChatStore;

#[derive(Default)]
pub struct InMemoryChatStore {
    // user_id -> chat_id -> Chat
    data: Mutex<HashMap<String, HashMap<String, Chat>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one stored chat, for assertions and inspection.
    pub fn get(&self, user_id: &str, chat_id: &str) -> Option<Chat> {
        self.data
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|chats| chats.get(chat_id))
            .cloned()
    }

    // Stub created by a partial write landing before the full document.
    fn create_on_write(chat_id: &str) -> Chat {
        Chat {
            id: chat_id.to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn load_chats(&self, user_id: &str) -> Result<Vec<Chat>> {
        let data = self.data.lock().unwrap();
        let mut chats: Vec<Chat> = data
            .get(user_id)
            .map(|chats| chats.values().cloned().collect())
            .unwrap_or_default();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn upsert_chat(&self, user_id: &str, chat: &Chat) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        data.entry(user_id.to_string())
            .or_default()
            .insert(chat.id.clone(), chat.clone());
        Ok(())
    }

    async fn update_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[ChatMessage],
    ) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        let chat = data
            .entry(user_id.to_string())
            .or_default()
            .entry(chat_id.to_string())
            .or_insert_with(|| Self::create_on_write(chat_id));
        chat.messages = messages.to_vec();
        Ok(())
    }

    async fn update_title(&self, user_id: &str, chat_id: &str, title: &str) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        let chat = data
            .entry(user_id.to_string())
            .or_default()
            .entry(chat_id.to_string())
            .or_insert_with(|| Self::create_on_write(chat_id));
        chat.title = title.to_string();
        Ok(())
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        if let Some(chats) = data.get_mut(user_id) {
            chats.remove(chat_id);
        }
        Ok(())
    }
}
