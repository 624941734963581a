pub mod chat;
pub mod message;

pub use chat::{derive_title, Chat, PLACEHOLDER_TITLE, TITLE_MAX_CHARS};
pub use message::{ChatMessage, Role};
