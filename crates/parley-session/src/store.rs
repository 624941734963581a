use parley_types::{Chat, ChatMessage};

/// Canonical in-memory collection of chats plus the active-chat pointer.
///
/// Every operation is an infallible local transform; operating on a chat
/// id that no longer exists is a defensive no-op. The store is owned
/// exclusively by its controller, so readers always observe a complete
/// state, never a half-applied mutation.
#[derive(Debug, Default)]
pub struct SessionStore {
    chats: Vec<Chat>,
    active_chat_id: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    fn chat_mut(&mut self, chat_id: &str) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|c| c.id == chat_id)
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        self.active_chat_id.as_deref()
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        let id = self.active_chat_id.as_deref()?;
        self.chat(id)
    }

    /// Point the active reference at an existing chat; no-op when absent.
    pub fn set_active(&mut self, chat_id: &str) {
        if self.chat(chat_id).is_some() {
            self.active_chat_id = Some(chat_id.to_string());
        } else {
            tracing::debug!(chat_id, "set_active on unknown chat ignored");
        }
    }

    /// Replace the whole collection after a successful load. Activates the
    /// most recent chat when none is active.
    pub fn replace_all(&mut self, chats: Vec<Chat>) {
        self.chats = chats;
        if self.active_chat_id.is_none() {
            self.active_chat_id = self.chats.first().map(|c| c.id.clone());
        }
    }

    /// Front-insert a fresh placeholder-titled chat, mark it active, and
    /// return its id. Synchronous: the chat is visible to the caller
    /// before any network write is attempted.
    pub fn create_chat(&mut self) -> String {
        let chat = Chat::new();
        let id = chat.id.clone();
        self.chats.insert(0, chat);
        self.active_chat_id = Some(id.clone());
        id
    }

    pub fn append_user_message(&mut self, chat_id: &str, content: impl Into<String>) {
        let Some(chat) = self.chat_mut(chat_id) else {
            tracing::debug!(chat_id, "append_user_message on unknown chat ignored");
            return;
        };
        chat.messages.push(ChatMessage::user(content));
    }

    /// Append an empty model message (the pending bubble) and return its
    /// id, the sole target for subsequent streaming folds.
    pub fn begin_assistant_message(&mut self, chat_id: &str) -> Option<String> {
        let chat = self.chat_mut(chat_id)?;
        let message = ChatMessage::model("");
        let id = message.id.clone();
        chat.messages.push(message);
        Some(id)
    }

    /// Concatenate one streamed text increment onto the addressed message.
    /// No other message is touched.
    pub fn fold_assistant_chunk(&mut self, chat_id: &str, message_id: &str, delta: &str) {
        let Some(chat) = self.chat_mut(chat_id) else {
            return;
        };
        if let Some(message) = chat.messages.iter_mut().find(|m| m.id == message_id) {
            message.content.push_str(delta);
        }
    }

    /// Freeze the streaming target with the authoritative final text,
    /// recomputed by the caller rather than trusted from accumulated
    /// folds, and apply the derived title if one was produced.
    pub fn finalize_assistant_message(
        &mut self,
        chat_id: &str,
        message_id: &str,
        final_content: &str,
        new_title: Option<String>,
    ) {
        let Some(chat) = self.chat_mut(chat_id) else {
            return;
        };
        if let Some(message) = chat.messages.iter_mut().find(|m| m.id == message_id) {
            message.content = final_content.to_string();
        }
        if let Some(title) = new_title {
            chat.title = title;
        }
    }

    /// Remove a chat. When it was active, the most recent remaining chat
    /// becomes active, or none if the collection is now empty.
    pub fn delete_chat(&mut self, chat_id: &str) {
        self.chats.retain(|c| c.id != chat_id);
        if self.active_chat_id.as_deref() == Some(chat_id) {
            self.active_chat_id = self.chats.first().map(|c| c.id.clone());
        }
    }
}
