//! Minimal end-to-end wiring: in-memory store, Gemini client from env,
//! static identity.
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --example simple_chat
//! ```

use std::sync::Arc;

use anyhow::Result;
use parley::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = GeminiConfig::from_env()?;
    let model = config.model.clone();
    let client = Arc::new(GeminiClient::new(config)?);
    let store: Arc<dyn ChatStore> = Arc::new(InMemoryChatStore::new());

    let (mut controller, mut notifications) = SessionController::new(store, client, model);
    controller
        .handle_auth_change(Some(AuthUser::new("local-user")))
        .await;

    controller
        .send_message("Give me one sentence about Rust.")
        .await;

    while let Ok(note) = notifications.try_recv() {
        eprintln!("[{:?}] {}", note.kind, note.message);
    }

    if let Some(chat) = controller.active_chat() {
        println!("# {}", chat.title);
        for message in &chat.messages {
            println!("{}: {}", message.role.as_str(), message.content);
        }
    }

    Ok(())
}
