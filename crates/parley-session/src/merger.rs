use std::sync::Arc;

use futures::StreamExt;
use parley_llm::{ChatClient, GenerateRequest, LlmError, StreamEvent, Turn};
use parley_types::{derive_title, ChatMessage, Role};

use crate::gateway::SyncGateway;
use crate::notify::Notification;
use crate::store::SessionStore;

/// Replaces the pending assistant message when a turn fails for
/// access-control reasons; visible in the transcript, also after reload.
pub const SECURITY_ERROR_MESSAGE: &str = "⚠️ **Security Error**: Access denied. \
    Please check the document store's security rules.";

/// Replaces the pending assistant message on any other failure.
pub const SYSTEM_ERROR_MESSAGE: &str =
    "⚠️ **System Error**: Request failed. Please try again in a moment.";

const RESPONSE_FAILED: &str = "The assistant encountered an error.";
const RESPONSE_PERMISSION_FAILED: &str =
    "Permission denied: check the inference service's access configuration.";

/// Fixed per-request behavior instruction. Supplied alongside the history
/// on every call, never stored as a message.
const SYSTEM_INSTRUCTION: &str = "You are Parley, a fast and precise AI companion. \
    Provide clear, direct, high-impact responses. Use professional Markdown formatting.";

/// Drives a single inference request per assistant turn and folds its
/// streamed output into the session store while it arrives.
pub struct ResponseMerger {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl ResponseMerger {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Run one assistant turn against the chat's current history.
    ///
    /// The stream runs to completion or to collaborator-reported failure;
    /// there is no cancellation, and folds keep targeting the originating
    /// chat regardless of which chat is currently displayed.
    pub async fn run(
        &self,
        store: &mut SessionStore,
        gateway: &mut SyncGateway,
        user_id: &str,
        chat_id: &str,
    ) {
        let history = match store.chat(chat_id) {
            Some(chat) => chat.messages.clone(),
            None => return,
        };
        let Some(message_id) = store.begin_assistant_message(chat_id) else {
            return;
        };

        let request = self.build_request(&history);

        let mut full_text = String::new();
        let outcome = self
            .consume_stream(store, chat_id, &message_id, request, &mut full_text)
            .await;

        match outcome {
            Ok(()) => {
                // First completed turn derives the title, exactly once.
                let new_title = store
                    .chat(chat_id)
                    .filter(|chat| chat.has_placeholder_title())
                    .and_then(|chat| chat.first_user_message())
                    .map(|first| derive_title(&first.content));

                if let Some(title) = &new_title {
                    gateway.update_title(user_id, chat_id, title).await;
                }

                // Authoritative recomputation of the final text; the
                // accumulated folds are not trusted to avoid drift.
                store.finalize_assistant_message(chat_id, &message_id, &full_text, new_title);

                // One persistence write per turn, never per chunk.
                if let Some(messages) = store.chat(chat_id).map(|c| c.messages.clone()) {
                    if let Err(err) = gateway.update_messages(user_id, chat_id, &messages).await
                    {
                        // The write already surfaced its notification; the
                        // transcript still gets the fixed error bubble.
                        let text = if err.is_permission_denied() {
                            SECURITY_ERROR_MESSAGE
                        } else {
                            SYSTEM_ERROR_MESSAGE
                        };
                        store.finalize_assistant_message(chat_id, &message_id, text, None);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, chat_id, "assistant turn failed");
                let is_permission = err.is_permission_denied();
                if is_permission {
                    gateway.flag_permission();
                    gateway
                        .notifier()
                        .notify(Notification::permission(RESPONSE_PERMISSION_FAILED));
                } else {
                    gateway
                        .notifier()
                        .notify(Notification::transient(RESPONSE_FAILED));
                }

                let text = if is_permission {
                    SECURITY_ERROR_MESSAGE
                } else {
                    SYSTEM_ERROR_MESSAGE
                };
                store.finalize_assistant_message(chat_id, &message_id, text, None);

                // Persist the error content best-effort so it survives
                // reload.
                if let Some(messages) = store.chat(chat_id).map(|c| c.messages.clone()) {
                    let _ = gateway.update_messages(user_id, chat_id, &messages).await;
                }
            }
        }
    }

    fn build_request(&self, history: &[ChatMessage]) -> GenerateRequest {
        let turns = history
            .iter()
            .map(|message| match message.role {
                Role::User => Turn::user(message.content.clone()),
                _ => Turn::model(message.content.clone()),
            })
            .collect();

        GenerateRequest::new(self.model.clone(), turns)
            .with_system_instruction(SYSTEM_INSTRUCTION)
    }

    async fn consume_stream(
        &self,
        store: &mut SessionStore,
        chat_id: &str,
        message_id: &str,
        request: GenerateRequest,
        full_text: &mut String,
    ) -> Result<(), LlmError> {
        let mut stream = self.client.generate_stream(request).await?;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Message { content } => {
                    full_text.push_str(&content);
                    store.fold_assistant_chunk(chat_id, message_id, &content);
                }
                StreamEvent::Done { .. } => break,
            }
        }

        Ok(())
    }
}
