//! Election directory view model

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ClientError;
use crate::gateway::ElectionGateway;
use crate::phase::{remaining_secs, resolve_phase};
use crate::store::ElectionStore;
use crate::types::{unix_now, Election, ElectionSummary};

/// One row of the directory. A single bad record renders as `Unavailable`
/// instead of aborting the whole listing.
#[derive(Debug)]
pub enum DirectoryEntry {
    Listed(ElectionSummary),
    Unavailable { id: u64, error: ClientError },
}

pub struct ElectionDirectory<G> {
    gateway: Arc<G>,
    store: Arc<ElectionStore>,
}

impl<G: ElectionGateway> ElectionDirectory<G> {
    pub fn new(gateway: Arc<G>, store: Arc<ElectionStore>) -> Self {
        Self { gateway, store }
    }

    /// Fetches every election in index order and annotates it with the
    /// phase at a single observation instant. Per-item fetch failures are
    /// recorded in place; only the initial count lookup can fail the call.
    pub async fn list_elections(&self) -> Result<Vec<DirectoryEntry>, ClientError> {
        let count = self.gateway.election_count().await?;
        debug!(count, "listing elections");

        let now = unix_now();
        let mut entries = Vec::with_capacity(count as usize);
        for id in 0..count {
            match self.gateway.get_election(id).await {
                Ok(election) => {
                    let summary = summarize(&election, now);
                    self.store.put_election(election);
                    entries.push(DirectoryEntry::Listed(summary));
                }
                Err(error) => {
                    warn!(id, %error, "election fetch failed, listing continues");
                    entries.push(DirectoryEntry::Unavailable { id, error });
                }
            }
        }
        Ok(entries)
    }
}

fn summarize(election: &Election, now: u64) -> ElectionSummary {
    ElectionSummary {
        id: election.id,
        title: election.title.clone(),
        start_time: election.start_time,
        end_time: election.end_time,
        phase: resolve_phase(election.start_time, election.end_time, now),
        remaining_secs: remaining_secs(election.start_time, election.end_time, now),
    }
}
