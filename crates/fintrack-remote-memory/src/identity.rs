use fintrack_core::IdentityProvider;
use fintrack_domain::Identity;
use tokio::sync::watch;
use tracing::info;

/// Identity provider driven by explicit sign-in and sign-out calls.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    current: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn sign_in(&self, identity: Identity) {
        info!(identity = %identity, "signed in");
        self.current.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        if self.current.send_replace(None).is_some() {
            info!("signed out");
        }
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn changes(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}
