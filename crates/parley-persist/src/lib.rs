pub mod error;
pub mod memory;
pub mod store;

#[cfg(feature = "mongodb")]
pub mod builder;
#[cfg(feature = "mongodb")]
pub mod client;
#[cfg(feature = "mongodb")]
pub mod models;
#[cfg(feature = "mongodb")]
pub mod repositories;

pub use error::{PersistError, Result};
pub use memory::InMemoryChatStore;
pub use store::ChatStore;

#[cfg(feature = "mongodb")]
pub use builder::PersistClientBuilder;
#[cfg(feature = "mongodb")]
pub use client::PersistClient;
#[cfg(feature = "mongodb")]
pub use models::{ChatDocument, StoredMessage};
#[cfg(feature = "mongodb")]
pub use repositories::ChatRepository;
