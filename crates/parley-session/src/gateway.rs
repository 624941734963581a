use std::sync::Arc;

use parley_persist::{ChatStore, PersistError};
use parley_types::{Chat, ChatMessage};

use crate::notify::{Notification, Notifier};

const LOAD_PERMISSION_FAILED: &str =
    "Permission denied: check the document store's security rules.";
const LOAD_FAILED: &str = "Failed to sync with cloud. Check your connection.";
const SAVE_FAILED: &str = "Cloud sync failed.";
const DELETE_FAILED: &str = "Failed to delete chat.";

/// Propagates session-store mutations to the remote document store and
/// loads its contents at session start.
///
/// Writes are fire-and-forget: a failure surfaces a notification and
/// leaves local state untouched; the optimistic local mutation is never
/// rolled back. The remote store is a best-effort durability layer, not a
/// consistency source of truth during the session.
pub struct SyncGateway {
    store: Arc<dyn ChatStore>,
    notifier: Notifier,
    permission_error: bool,
}

impl SyncGateway {
    pub fn new(store: Arc<dyn ChatStore>, notifier: Notifier) -> Self {
        Self {
            store,
            notifier,
            permission_error: false,
        }
    }

    /// Sticky flag: set when any remote call was rejected for
    /// access-control reasons, cleared by the next explicit load.
    pub fn permission_error(&self) -> bool {
        self.permission_error
    }

    pub(crate) fn flag_permission(&mut self) {
        self.permission_error = true;
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Fetch all chats for the user, newest first. On failure the caller
    /// keeps its prior state; no automatic retry.
    pub async fn load(&mut self, user_id: &str) -> Result<Vec<Chat>, PersistError> {
        self.permission_error = false;

        match self.store.load_chats(user_id).await {
            Ok(chats) => Ok(chats),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load chats");
                if err.is_permission_denied() {
                    self.permission_error = true;
                    self.notifier
                        .notify(Notification::permission(LOAD_PERMISSION_FAILED));
                } else {
                    self.notifier.notify(Notification::transient(LOAD_FAILED));
                }
                Err(err)
            }
        }
    }

    pub async fn create(&mut self, user_id: &str, chat: &Chat) {
        if let Err(err) = self.store.upsert_chat(user_id, chat).await {
            self.report_write_failure("create chat", err, SAVE_FAILED);
        }
    }

    pub async fn update_messages(
        &mut self,
        user_id: &str,
        chat_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), PersistError> {
        match self.store.update_messages(user_id, chat_id, messages).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.report_write_failure("update messages", err, SAVE_FAILED)),
        }
    }

    pub async fn update_title(&mut self, user_id: &str, chat_id: &str, title: &str) {
        if let Err(err) = self.store.update_title(user_id, chat_id, title).await {
            self.report_write_failure("update title", err, SAVE_FAILED);
        }
    }

    pub async fn remove(&mut self, user_id: &str, chat_id: &str) {
        if let Err(err) = self.store.delete_chat(user_id, chat_id).await {
            self.report_write_failure("delete chat", err, DELETE_FAILED);
        }
    }

    fn report_write_failure(
        &mut self,
        context: &str,
        err: PersistError,
        fallback: &str,
    ) -> PersistError {
        tracing::warn!(error = %err, "failed to {}", context);
        if err.is_permission_denied() {
            self.permission_error = true;
            self.notifier
                .notify(Notification::permission(LOAD_PERMISSION_FAILED));
        } else {
            self.notifier.notify(Notification::transient(fallback));
        }
        err
    }
}
