//! Account session management
//!
//! Binds the client to the single active signing account surfaced by the
//! external wallet agent and fans change notifications out to listeners.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::types::Address;

/// Wallet agent surface consumed by the session manager. The transport is
/// external; signing is entirely delegated to the agent.
#[async_trait]
pub trait WalletAgent: Send + Sync {
    /// Requests wallet permission and returns the accounts the user exposed.
    /// An unreachable agent fails with [`ClientError::WalletUnavailable`].
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError>;

    /// Currently selected account, if any.
    async fn selected_account(&self) -> Result<Option<Address>, ClientError>;
}

type AccountListener = Box<dyn Fn(Option<&Address>) + Send + Sync>;

#[derive(Default)]
struct SessionState {
    account: Mutex<Option<Address>>,
    listeners: Mutex<Vec<AccountListener>>,
}

impl SessionState {
    /// Applies a new active account and notifies listeners. The stored
    /// account is updated before any listener runs, so listeners never
    /// observe a stale value.
    fn apply(&self, next: Option<Address>) {
        {
            let mut current = self.account.lock().expect("session mutex poisoned");
            if *current == next {
                return;
            }
            *current = next.clone();
        }
        info!(
            account = next.as_ref().map(|a| a.as_str()).unwrap_or("<none>"),
            "active account changed"
        );
        let listeners = self.listeners.lock().expect("listener mutex poisoned");
        for listener in listeners.iter() {
            listener(next.as_ref());
        }
    }
}

/// Cheap read handle onto the session, usable without the wallet type.
#[derive(Clone, Default)]
pub struct SessionHandle {
    state: Arc<SessionState>,
}

impl SessionHandle {
    /// Best-effort, non-blocking view of the active account.
    pub fn current_account(&self) -> Option<Address> {
        self.state
            .account
            .lock()
            .expect("session mutex poisoned")
            .clone()
    }
}

pub struct SessionManager<W> {
    wallet: W,
    handle: SessionHandle,
}

impl<W: WalletAgent> SessionManager<W> {
    pub fn new(wallet: W) -> Self {
        Self {
            wallet,
            handle: SessionHandle::default(),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn current_account(&self) -> Option<Address> {
        self.handle.current_account()
    }

    /// Requests wallet permission and binds the selected account. Declining
    /// the request (no accounts exposed) fails with `PermissionDenied`.
    pub async fn request_session(&self) -> Result<Address, ClientError> {
        let accounts = self.wallet.request_accounts().await?;
        let Some(account) = accounts.into_iter().next() else {
            return Err(ClientError::PermissionDenied);
        };
        self.handle.state.apply(Some(account.clone()));
        Ok(account)
    }

    /// Registers a listener invoked on every account change. By the time a
    /// listener runs, `current_account` already returns the new value.
    pub fn on_account_changed(&self, listener: impl Fn(Option<&Address>) + Send + Sync + 'static) {
        self.handle
            .state
            .listeners
            .lock()
            .expect("listener mutex poisoned")
            .push(Box::new(listener));
    }

    /// Entry point for wallet "accounts changed" notifications. The first
    /// account in the list becomes the active one; an empty list unbinds the
    /// session (no account means no voting).
    pub fn handle_accounts_changed(&self, accounts: &[Address]) {
        self.handle.state.apply(accounts.first().cloned());
    }

    /// Polls the wallet for the selected account and feeds changes through
    /// [`Self::handle_accounts_changed`]. Runs until the future is dropped;
    /// a poll failure leaves the current binding in place.
    pub async fn watch_accounts(&self, poll_interval: Duration) {
        loop {
            tokio::time::sleep(poll_interval).await;
            match self.wallet.selected_account().await {
                Ok(selected) => {
                    debug!(
                        selected = selected.as_ref().map(|a| a.as_str()).unwrap_or("<none>"),
                        "polled wallet for selected account"
                    );
                    self.handle.state.apply(selected);
                }
                Err(err) => warn!(error = %err, "wallet poll failed"),
            }
        }
    }
}
