pub mod auth;
pub mod controller;
pub mod gateway;
pub mod merger;
pub mod notify;
pub mod store;

pub use auth::{AuthUser, IdentityProvider, StaticIdentityProvider};
pub use controller::SessionController;
pub use gateway::SyncGateway;
pub use merger::{ResponseMerger, SECURITY_ERROR_MESSAGE, SYSTEM_ERROR_MESSAGE};
pub use notify::{Notification, NotificationKind, Notifier};
pub use store::SessionStore;
