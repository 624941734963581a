use std::sync::Arc;

use parley_llm::ChatClient;
use parley_persist::ChatStore;
use parley_types::Chat;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::auth::{AuthUser, IdentityProvider};
use crate::gateway::SyncGateway;
use crate::merger::ResponseMerger;
use crate::notify::{Notification, Notifier};
use crate::store::SessionStore;

/// Top-level owner of application state: the session store, the sync
/// gateway, the merger, the current identity, and the global send lock.
///
/// Single logical task; overlapping work interleaves at await points
/// only. New sends are refused while any response is pending: a single
/// global lock rather than a per-chat one.
pub struct SessionController {
    store: SessionStore,
    gateway: SyncGateway,
    merger: ResponseMerger,
    user: Option<AuthUser>,
    pending: bool,
    pending_delete: Option<String>,
}

impl SessionController {
    pub fn new(
        chat_store: Arc<dyn ChatStore>,
        llm: Arc<dyn ChatClient>,
        model: impl Into<String>,
    ) -> (Self, UnboundedReceiver<Notification>) {
        let (notifier, notifications) = Notifier::channel();
        let controller = Self {
            store: SessionStore::new(),
            gateway: SyncGateway::new(chat_store, notifier),
            merger: ResponseMerger::new(llm, model),
            user: None,
            pending: false,
            pending_delete: None,
        };
        (controller, notifications)
    }

    // ─── Read surface ───

    pub fn chats(&self) -> &[Chat] {
        self.store.chats()
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.store.active_chat()
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        self.store.active_chat_id()
    }

    pub fn response_pending(&self) -> bool {
        self.pending
    }

    pub fn permission_error(&self) -> bool {
        self.gateway.permission_error()
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    // ─── Identity transitions ───

    /// React to an identity change. Transition to authenticated triggers
    /// the one load of the session; sign-out clears all local state.
    pub async fn handle_auth_change(&mut self, user: Option<AuthUser>) {
        match user {
            Some(user) => {
                let is_new_session = self
                    .user
                    .as_ref()
                    .map_or(true, |current| current.uid != user.uid);
                self.user = Some(user);
                if is_new_session {
                    self.store = SessionStore::new();
                    self.pending_delete = None;
                    self.load().await;
                }
            }
            None => {
                self.user = None;
                self.store = SessionStore::new();
                self.pending_delete = None;
            }
        }
    }

    /// Drive the controller from an identity subscription until the
    /// provider goes away.
    pub async fn run(&mut self, provider: &dyn IdentityProvider) {
        let mut subscription = provider.subscribe();
        let current = subscription.borrow_and_update().clone();
        self.handle_auth_change(current).await;

        while subscription.changed().await.is_ok() {
            let user = subscription.borrow_and_update().clone();
            self.handle_auth_change(user).await;
        }
    }

    /// Manual retry action for the persistent permission notification.
    pub async fn reload(&mut self) {
        self.load().await;
    }

    async fn load(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };
        if let Ok(chats) = self.gateway.load(&user.uid).await {
            self.store.replace_all(chats);
        }
    }

    // ─── Chat actions ───

    pub async fn new_chat(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };
        let chat_id = self.store.create_chat();
        let chat = self
            .store
            .chat(&chat_id)
            .cloned()
            .expect("chat just created");
        self.gateway.create(&user.uid, &chat).await;
    }

    pub fn select_chat(&mut self, chat_id: &str) {
        self.store.set_active(chat_id);
    }

    /// Send a user message into the active chat, creating a chat when
    /// none is active, then drive the assistant turn to completion.
    /// Refused while a response is pending anywhere (global lock) or
    /// while signed out.
    pub async fn send_message(&mut self, content: impl Into<String>) {
        let Some(user) = self.user.clone() else {
            return;
        };
        if self.pending {
            tracing::debug!("send refused while a response is pending");
            return;
        }
        let content = content.into();

        let chat_id = match self.store.active_chat_id() {
            Some(id) => id.to_string(),
            None => {
                let id = self.store.create_chat();
                let chat = self.store.chat(&id).cloned().expect("chat just created");
                self.gateway.create(&user.uid, &chat).await;
                id
            }
        };

        self.store.append_user_message(&chat_id, content);

        self.pending = true;
        self.merger
            .run(&mut self.store, &mut self.gateway, &user.uid, &chat_id)
            .await;
        self.pending = false;
    }

    // ─── Deletion (two-step confirmation) ───

    pub fn request_delete(&mut self, chat_id: &str) {
        if self.store.chat(chat_id).is_some() {
            self.pending_delete = Some(chat_id.to_string());
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) {
        let Some(chat_id) = self.pending_delete.take() else {
            return;
        };
        let Some(user) = self.user.clone() else {
            return;
        };
        self.store.delete_chat(&chat_id);
        self.gateway.remove(&user.uid, &chat_id).await;
    }

    // ─── Export ───

    /// Flat text transcript of every chat; a derived read-only view,
    /// never persisted.
    pub fn export_transcript(&self) -> String {
        let sections: Vec<String> = self
            .store
            .chats()
            .iter()
            .map(|chat| {
                let messages: Vec<String> = chat
                    .messages
                    .iter()
                    .map(|m| {
                        format!(
                            "[{}] {}: {}",
                            format_timestamp(m.timestamp),
                            m.role.as_str().to_uppercase(),
                            m.content
                        )
                    })
                    .collect();
                format!(
                    "--- SESSION: {} ---\nCreated: {}\n\n{}\n\n",
                    chat.title,
                    format_timestamp(chat.created_at),
                    messages.join("\n")
                )
            })
            .collect();

        sections.join(&format!("\n{}\n\n", "=".repeat(50)))
    }
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
