use std::sync::Arc;

use anyhow::{Context, Result};
use parley_llm::{GeminiClient, GeminiConfig};
use parley_session::{Notification, SessionController};
use tokio::sync::mpsc::UnboundedReceiver;

/// Assembles a [`SessionController`] wired to the real collaborators:
/// the Gemini inference client and the MongoDB chat store.
pub struct ParleyBuilder {
    gemini: Option<GeminiConfig>,
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl ParleyBuilder {
    pub fn new() -> Self {
        Self {
            gemini: None,
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn gemini_config(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    #[cfg(feature = "mongodb")]
    pub async fn build(
        self,
    ) -> Result<(SessionController, UnboundedReceiver<Notification>)> {
        use parley_persist::{ChatStore, PersistClient};

        let gemini = self
            .gemini
            .context("gemini_config is required")?;
        let mongodb_uri = self.mongodb_uri.context("mongodb_uri is required")?;
        let database = self.database.context("database is required")?;

        let model = gemini.model.clone();
        let client = Arc::new(GeminiClient::new(gemini)?);

        let persist = PersistClient::new(&mongodb_uri, &database).await?;
        let chat_store: Arc<dyn ChatStore> = Arc::new(persist.chats().clone());

        Ok(SessionController::new(chat_store, client, model))
    }
}

impl Default for ParleyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
