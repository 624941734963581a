//! Parley: the portable core of a multi-session chat client.
//!
//! Keeps an in-memory list of chats in sync with a remote document store,
//! folds streamed model responses into the right message, and reacts to
//! identity transitions. Local state is optimistic: mutations apply
//! immediately and remote writes are best-effort merge-upserts surfaced
//! through notifications, never rollbacks.
//!
//! ```rust,ignore
//! use parley::prelude::*;
//!
//! let (mut controller, notifications) = ParleyBuilder::new()
//!     .gemini_config(GeminiConfig::from_env()?)
//!     .mongodb_uri("mongodb://localhost:27017")
//!     .database("parley")
//!     .build()
//!     .await?;
//!
//! controller.handle_auth_change(Some(AuthUser::new("uid"))).await;
//! controller.send_message("Hello").await;
//! ```

pub use parley_llm as llm;
pub use parley_persist as persist;
pub use parley_session as session;
pub use parley_types as types;

mod builder;

pub mod prelude;

pub use builder::ParleyBuilder;
