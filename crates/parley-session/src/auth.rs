use async_trait::async_trait;
use tokio::sync::watch;

/// The authenticated identity, opaque to the core beyond its uid. All
/// persistence operations are gated on its presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub display_name: Option<String>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Identity/auth provider seam.
///
/// The subscription yields the current identity (or none) on every
/// change; sign-in mechanics live behind the provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;

    async fn sign_out(&self) -> anyhow::Result<()>;
}

/// Watch-channel-backed provider for tests and in-process embedding.
pub struct StaticIdentityProvider {
    tx: watch::Sender<Option<AuthUser>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn signed_in(user: AuthUser) -> Self {
        let (tx, _) = watch::channel(Some(user));
        Self { tx }
    }

    pub fn set_user(&self, user: Option<AuthUser>) {
        // send_replace updates the value even with no live subscribers.
        self.tx.send_replace(user);
    }
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.tx.subscribe()
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        self.set_user(None);
        Ok(())
    }
}
