//! Vote submission controller
//!
//! Orchestrates the full vote action: preflight validation, duplicate-vote
//! guard, submission, confirmation wait and post-confirmation refresh.
//! The authoritative re-checks of the vote record and the election phase
//! happen immediately before submission, not at render time, which closes
//! the window where the election could have ended or the account could have
//! voted through another tab between render and click.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::ClientError;
use crate::gateway::{ElectionGateway, TransactionHandle};
use crate::phase::{resolve_phase, Phase};
use crate::session::SessionHandle;
use crate::store::ElectionStore;
use crate::types::{unix_now, Address, PendingSubmission, Receipt, SubmissionStatus};

type InFlightMap = Arc<Mutex<HashMap<(u64, Address), PendingSubmission>>>;

pub struct VoteSubmissionController<G> {
    gateway: Arc<G>,
    store: Arc<ElectionStore>,
    session: SessionHandle,
    in_flight: InFlightMap,
}

impl<G: ElectionGateway> VoteSubmissionController<G> {
    pub fn new(gateway: Arc<G>, store: Arc<ElectionStore>, session: SessionHandle) -> Self {
        Self {
            gateway,
            store,
            session,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The in-flight submission for `(election_id, account)`, if any.
    pub fn pending_submission(&self, election_id: u64, account: &Address) -> Option<PendingSubmission> {
        self.in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .get(&(election_id, account.clone()))
            .cloned()
    }

    /// Submits a vote for `candidate_index` in `election_id` under the
    /// account bound at the time of the call. The whole sequence runs under
    /// the per-(election, account) submission lock; an account switch during
    /// the confirmation wait does not rebind the in-flight action.
    pub async fn submit_vote(
        &self,
        election_id: u64,
        candidate_index: usize,
    ) -> Result<Receipt, ClientError> {
        // Fail closed: no bound account, no vote.
        let account = self.session.current_account().ok_or(ClientError::NoAccount)?;

        // 1. Mutual exclusion per (election, account). The reservation also
        // covers the preflight reads so two clicks cannot interleave.
        let guard = InFlightGuard::acquire(
            &self.in_flight,
            election_id,
            candidate_index,
            account.clone(),
        )?;

        // 2. Candidate index against the last-known candidate count; fetched
        // fresh when nothing is cached yet.
        let count = match self.store.candidate_count(election_id) {
            Some(count) => count,
            None => self.gateway.get_candidates(election_id).await?.len(),
        };
        if candidate_index >= count {
            return Err(ClientError::InvalidCandidate {
                index: candidate_index,
                count,
            });
        }

        // 3. Authoritative vote-record re-fetch. The cache is never trusted
        // for this decision.
        if self.gateway.has_voted(election_id, &account).await? {
            return Err(ClientError::AlreadyVoted(election_id));
        }

        // 4. Phase from freshly fetched window bounds.
        let election = self.gateway.get_election(election_id).await?;
        let phase = resolve_phase(election.start_time, election.end_time, unix_now());
        if phase != Phase::Ongoing {
            return Err(ClientError::ElectionNotOpen {
                id: election_id,
                phase,
            });
        }

        // 5. Submit.
        let handle = self.gateway.vote(election_id, candidate_index).await?;
        info!(
            election_id,
            candidate_index,
            account = account.as_str(),
            tx_hash = handle.tx_hash(),
            "vote submitted"
        );

        // 6. Await confirmation. Failure kinds propagate unchanged; the
        // action is never resubmitted.
        match handle.await_confirmation().await {
            Ok(receipt) => {
                guard.set_status(SubmissionStatus::Confirmed);
                self.refresh_after_confirmation(election_id, &account).await;
                info!(election_id, tx_hash = %receipt.tx_hash, "vote confirmed");
                Ok(receipt)
            }
            Err(err) => {
                guard.set_status(SubmissionStatus::Failed);
                warn!(election_id, error = %err, "vote failed");
                Err(err)
            }
        }
    }

    /// Folds the confirmed vote's effects back into view state: fresh
    /// candidate counts and the vote record for the submitting account.
    /// Confirmation already happened, so a failed refresh only logs; the
    /// next explicit refresh reconciles.
    async fn refresh_after_confirmation(&self, election_id: u64, account: &Address) {
        match self.gateway.get_election(election_id).await {
            Ok(election) => {
                let phase = resolve_phase(election.start_time, election.end_time, unix_now());
                info!(election_id, %phase, "election re-fetched after confirmation");
                self.store.put_election(election);
            }
            Err(err) => warn!(election_id, error = %err, "post-confirmation election refresh failed"),
        }
        match self.gateway.has_voted(election_id, account).await {
            Ok(voted) => self.store.put_vote_record(election_id, account.clone(), voted),
            Err(err) => warn!(election_id, error = %err, "post-confirmation vote record refresh failed"),
        }
    }
}

/// Holds the (election, account) reservation for the duration of one
/// submission. Dropping the guard releases the reservation on every exit
/// path, including cancellation at an await point: the submitted action may
/// still confirm remotely, and the next `has_voted` read detects that.
struct InFlightGuard {
    map: InFlightMap,
    key: (u64, Address),
}

impl InFlightGuard {
    fn acquire(
        map: &InFlightMap,
        election_id: u64,
        candidate_index: usize,
        account: Address,
    ) -> Result<Self, ClientError> {
        let key = (election_id, account.clone());
        let mut in_flight = map.lock().expect("in-flight mutex poisoned");
        if in_flight.contains_key(&key) {
            return Err(ClientError::AlreadyVoting(election_id));
        }
        in_flight.insert(
            key.clone(),
            PendingSubmission {
                election_id,
                candidate_index,
                account,
                status: SubmissionStatus::Submitted,
            },
        );
        Ok(Self {
            map: Arc::clone(map),
            key,
        })
    }

    fn set_status(&self, status: SubmissionStatus) {
        let mut in_flight = self.map.lock().expect("in-flight mutex poisoned");
        if let Some(pending) = in_flight.get_mut(&self.key) {
            pending.status = status;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map
            .lock()
            .expect("in-flight mutex poisoned")
            .remove(&self.key);
    }
}
