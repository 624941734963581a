use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};
use parley_types::{Chat, ChatMessage};

use crate::error::Result;
use crate::models::{ChatDocument, StoredMessage};
use crate::store::ChatStore;

const CHATS_COLLECTION: &str = "chats";

#[derive(Clone)]
pub struct ChatRepository {
    collection: Collection<ChatDocument>,
}

impl ChatRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection(CHATS_COLLECTION);
        Self { collection }
    }

    /// List all chats for a user, newest first.
    pub async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>> {
        let filter = doc! { "userId": user_id };
        let documents: Vec<ChatDocument> = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(ChatDocument::into_chat).collect())
    }

    /// Merge-upsert the full chat document.
    pub async fn save_chat(&self, user_id: &str, chat: &Chat) -> Result<()> {
        let document = ChatDocument::from_chat(user_id, chat);
        // _id is immutable; it comes from the filter on the upsert path.
        let mut fields = bson::to_document(&document)?;
        fields.remove("_id");

        let filter = doc! { "_id": &chat.id, "userId": user_id };
        self.collection
            .update_one(filter, doc! { "$set": fields })
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Merge-write of the `messages` field only.
    pub async fn save_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[ChatMessage],
    ) -> Result<()> {
        let stored: Vec<StoredMessage> = messages.iter().map(StoredMessage::from).collect();
        let filter = doc! { "_id": chat_id, "userId": user_id };
        let update = doc! {
            "$set": {
                "messages": bson::to_bson(&stored)?,
                "updatedAt": bson::DateTime::now()
            }
        };

        self.collection.update_one(filter, update).upsert(true).await?;
        Ok(())
    }

    /// Merge-write of the `title` field only.
    pub async fn save_title(&self, user_id: &str, chat_id: &str, title: &str) -> Result<()> {
        let filter = doc! { "_id": chat_id, "userId": user_id };
        let update = doc! {
            "$set": {
                "title": title,
                "updatedAt": bson::DateTime::now()
            }
        };

        self.collection.update_one(filter, update).upsert(true).await?;
        Ok(())
    }

    /// Delete the chat document; deleting a missing document succeeds.
    pub async fn remove_chat(&self, user_id: &str, chat_id: &str) -> Result<()> {
        let filter = doc! { "_id": chat_id, "userId": user_id };
        self.collection.delete_one(filter).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn load_chats(&self, user_id: &str) -> Result<Vec<Chat>> {
        self.list_chats(user_id).await
    }

    async fn upsert_chat(&self, user_id: &str, chat: &Chat) -> Result<()> {
        self.save_chat(user_id, chat).await
    }

    async fn update_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[ChatMessage],
    ) -> Result<()> {
        self.save_messages(user_id, chat_id, messages).await
    }

    async fn update_title(&self, user_id: &str, chat_id: &str, title: &str) -> Result<()> {
        self.save_title(user_id, chat_id, title).await
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<()> {
        self.remove_chat(user_id, chat_id).await
    }
}
