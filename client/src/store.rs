//! Process-wide view state
//!
//! One cache for the whole client: per-election snapshots and per-account
//! vote records. Written only by the submission controller's
//! post-confirmation refresh and by explicit refresh; an account switch
//! invalidates everything, the same as opening a different user's session.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{Address, Election};

#[derive(Default)]
pub struct ElectionStore {
    elections: Mutex<HashMap<u64, Election>>,
    /// Vote records are keyed by the account they were fetched for. A record
    /// cached for one account is never served for another; it gates an
    /// irreversible action.
    vote_records: Mutex<HashMap<(u64, Address), bool>>,
}

impl ElectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn election(&self, id: u64) -> Option<Election> {
        self.elections
            .lock()
            .expect("election store mutex poisoned")
            .get(&id)
            .cloned()
    }

    pub fn candidate_count(&self, id: u64) -> Option<usize> {
        self.elections
            .lock()
            .expect("election store mutex poisoned")
            .get(&id)
            .map(|e| e.candidates.len())
    }

    pub fn put_election(&self, election: Election) {
        self.elections
            .lock()
            .expect("election store mutex poisoned")
            .insert(election.id, election);
    }

    pub fn vote_record(&self, id: u64, account: &Address) -> Option<bool> {
        self.vote_records
            .lock()
            .expect("vote record mutex poisoned")
            .get(&(id, account.clone()))
            .copied()
    }

    pub fn put_vote_record(&self, id: u64, account: Address, has_voted: bool) {
        self.vote_records
            .lock()
            .expect("vote record mutex poisoned")
            .insert((id, account), has_voted);
    }

    pub fn invalidate_all(&self) {
        self.elections
            .lock()
            .expect("election store mutex poisoned")
            .clear();
        self.vote_records
            .lock()
            .expect("vote record mutex poisoned")
            .clear();
    }
}
