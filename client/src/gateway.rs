//! Remote election gateway surface
//!
//! The contract behind this trait is external: eligibility rules, tallying
//! and time-window enforcement all live remotely. The client consumes this
//! surface and treats it as eventually consistent after confirmation.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::{Address, Candidate, Election, NewElection, Receipt};

/// Read/write operations exposed by the election contract. Reads are
/// idempotent and side-effect-free from the client's perspective.
#[async_trait]
pub trait ElectionGateway: Send + Sync {
    type Handle: TransactionHandle;

    async fn election_count(&self) -> Result<u64, ClientError>;

    /// Fails with [`ClientError::NotFound`] when `id` is out of range.
    async fn get_election(&self, id: u64) -> Result<Election, ClientError>;

    async fn get_candidates(&self, id: u64) -> Result<Vec<Candidate>, ClientError>;

    async fn has_voted(&self, id: u64, account: &Address) -> Result<bool, ClientError>;

    /// Submits a vote under the currently bound signing account.
    async fn vote(&self, id: u64, candidate_index: usize) -> Result<Self::Handle, ClientError>;

    /// Owner-restricted by the gateway; a rejection surfaces on confirmation.
    async fn create_election(&self, params: NewElection) -> Result<Self::Handle, ClientError>;
}

/// In-flight transaction returned by the mutating operations.
#[async_trait]
pub trait TransactionHandle: Send + Sized {
    fn tx_hash(&self) -> &str;

    /// Suspends until the network confirms or rejects the action. Rejection
    /// surfaces as one of the distinguishable transaction failures
    /// (`Reverted`, `Underpriced`, `Timeout`, `NetworkUnreachable`), never a
    /// generic error.
    async fn await_confirmation(self) -> Result<Receipt, ClientError>;
}
