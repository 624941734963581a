use mongodb::Client;

use crate::error::{PersistError, Result};
use crate::repositories::ChatRepository;

/// Facade over the document-store connection.
pub struct PersistClient {
    chats: ChatRepository,
}

impl PersistClient {
    pub async fn new(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            chats: ChatRepository::new(&client, db_name),
        })
    }

    pub fn chats(&self) -> &ChatRepository {
        &self.chats
    }
}
