//! Top-level client facade
//!
//! Owns the wiring between the session manager, the shared store, the
//! submission controller and the directory view model, so that every front
//! end (CLI, embedding application) gets the same lifecycle behavior.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::directory::{DirectoryEntry, ElectionDirectory};
use crate::error::ClientError;
use crate::gateway::{ElectionGateway, TransactionHandle};
use crate::phase::{remaining_secs, resolve_phase, Phase};
use crate::session::{SessionManager, WalletAgent};
use crate::store::ElectionStore;
use crate::submit::VoteSubmissionController;
use crate::types::{unix_now, Address, Election, NewElection, PendingSubmission, Receipt};

/// Per-election view for a detail page: the fresh projection plus the
/// account-scoped vote record (`None` when no account is bound).
#[derive(Debug)]
pub struct ElectionView {
    pub election: Election,
    pub phase: Phase,
    pub remaining_secs: u64,
    pub has_voted: Option<bool>,
}

pub struct ElectionClient<G, W> {
    gateway: Arc<G>,
    session: SessionManager<W>,
    store: Arc<ElectionStore>,
    directory: ElectionDirectory<G>,
    controller: VoteSubmissionController<G>,
}

impl<G: ElectionGateway, W: WalletAgent> ElectionClient<G, W> {
    pub fn new(gateway: G, wallet: W) -> Self {
        let gateway = Arc::new(gateway);
        let store = Arc::new(ElectionStore::new());
        let session = SessionManager::new(wallet);

        // An account switch is a new user session: drop every cached
        // projection before anything reads under the new identity.
        let invalidate = Arc::clone(&store);
        session.on_account_changed(move |_| invalidate.invalidate_all());

        let directory = ElectionDirectory::new(Arc::clone(&gateway), Arc::clone(&store));
        let controller =
            VoteSubmissionController::new(Arc::clone(&gateway), Arc::clone(&store), session.handle());

        Self {
            gateway,
            session,
            store,
            directory,
            controller,
        }
    }

    /// Requests wallet permission and binds the selected account.
    pub async fn connect(&self) -> Result<Address, ClientError> {
        self.session.request_session().await
    }

    pub fn account(&self) -> Option<Address> {
        self.session.current_account()
    }

    /// Feed for external "accounts changed" notifications.
    pub fn handle_accounts_changed(&self, accounts: &[Address]) {
        self.session.handle_accounts_changed(accounts);
    }

    /// Polls the wallet agent for account switches until dropped.
    pub async fn watch_accounts(&self, poll_interval: Duration) {
        self.session.watch_accounts(poll_interval).await;
    }

    pub fn on_account_changed(&self, listener: impl Fn(Option<&Address>) + Send + Sync + 'static) {
        self.session.on_account_changed(listener);
    }

    pub async fn list_elections(&self) -> Result<Vec<DirectoryEntry>, ClientError> {
        self.directory.list_elections().await
    }

    /// Fresh per-election view; also the explicit refresh path that folds a
    /// new snapshot (and the current account's vote record) into the store.
    pub async fn election_details(&self, id: u64) -> Result<ElectionView, ClientError> {
        let election = self.gateway.get_election(id).await?;
        self.store.put_election(election.clone());

        let has_voted = match self.session.current_account() {
            Some(account) => {
                let voted = self.gateway.has_voted(id, &account).await?;
                self.store.put_vote_record(id, account, voted);
                Some(voted)
            }
            None => None,
        };

        let now = unix_now();
        Ok(ElectionView {
            phase: resolve_phase(election.start_time, election.end_time, now),
            remaining_secs: remaining_secs(election.start_time, election.end_time, now),
            election,
            has_voted,
        })
    }

    pub async fn submit_vote(
        &self,
        election_id: u64,
        candidate_index: usize,
    ) -> Result<Receipt, ClientError> {
        self.controller.submit_vote(election_id, candidate_index).await
    }

    /// In-flight submission for the active account, if any.
    pub fn pending_submission(&self, election_id: u64) -> Option<PendingSubmission> {
        let account = self.session.current_account()?;
        self.controller.pending_submission(election_id, &account)
    }

    /// Creates a new election. The schedule is validated locally before any
    /// network call; the owner restriction is the gateway's to enforce.
    pub async fn create_election(&self, params: NewElection) -> Result<Receipt, ClientError> {
        if params.start_time >= params.end_time {
            return Err(ClientError::InvalidSchedule);
        }
        if self.session.current_account().is_none() {
            return Err(ClientError::NoAccount);
        }

        let title = params.title.clone();
        let handle = self.gateway.create_election(params).await?;
        info!(%title, tx_hash = handle.tx_hash(), "election creation submitted");
        handle.await_confirmation().await
    }
}
