use moviemuse_models::UserIdentity;
use tokio::sync::watch;

/// Read access to "current identity, or none", plus change notifications.
///
/// Passed into [`crate::Watchlist`] explicitly so tests can substitute a
/// scripted provider.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;

    /// Channel carrying the identity; the receiver's current value is the
    /// signed-in user at subscription time.
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;
}

/// Process-local session identity backed by a watch channel.
pub struct SessionIdentity {
    tx: watch::Sender<Option<UserIdentity>>,
}

impl SessionIdentity {
    pub fn new(initial: Option<UserIdentity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    pub fn sign_in(&self, user: UserIdentity) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.tx.subscribe()
    }
}
