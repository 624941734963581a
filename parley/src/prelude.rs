//! Convenience re-exports for the common wiring surface.

pub use crate::builder::ParleyBuilder;

pub use parley_types::{derive_title, Chat, ChatMessage, Role, PLACEHOLDER_TITLE};

pub use parley_llm::{ChatClient, GeminiClient, GeminiConfig, StreamEvent, DEFAULT_MODEL};

pub use parley_persist::{ChatStore, InMemoryChatStore, PersistError};
#[cfg(feature = "mongodb")]
pub use parley_persist::{PersistClient, PersistClientBuilder};

pub use parley_session::{
    AuthUser, IdentityProvider, Notification, NotificationKind, SessionController,
    StaticIdentityProvider,
};
