//! Domain types shared across the client

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::phase::Phase;

/// Address-like token identifying a signing account. The wallet agent owns
/// the set of accounts; the client only observes the selected one.
///
/// Comparison is case-insensitive: the token is normalized to lowercase on
/// construction so that two spellings of the same account never produce two
/// distinct vote records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ClientError::NoAccount);
        }
        Ok(Self::new(s.trim()))
    }
}

/// A single entry in an election's candidate sequence. The index into that
/// sequence is the candidate's identity for voting purposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub vote_count: u64,
}

/// Read-only projection of an election held by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Index assigned by the gateway at creation, immutable.
    pub id: u64,
    pub title: String,
    pub candidates: Vec<Candidate>,
    /// Unix seconds.
    pub start_time: u64,
    /// Unix seconds. The gateway guarantees end > start.
    pub end_time: u64,
}

/// Parameters for creating a new election. Owner restriction is enforced by
/// the gateway, not here.
#[derive(Clone, Debug, Serialize)]
pub struct NewElection {
    pub title: String,
    pub candidates: Vec<String>,
    pub start_time: u64,
    pub end_time: u64,
}

/// Confirmation receipt for a submitted transaction.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Displayable, time-annotated election summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ElectionSummary {
    pub id: u64,
    pub title: String,
    pub start_time: u64,
    pub end_time: u64,
    pub phase: Phase,
    /// Seconds until the voting window closes; zero unless Ongoing.
    pub remaining_secs: u64,
}

/// Lifecycle of an in-flight vote transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    Submitted,
    Confirmed,
    Failed,
}

/// Ephemeral record of an in-flight vote. At most one exists per
/// (election, account) pair; its presence is the double-submit lock.
#[derive(Clone, Debug)]
pub struct PendingSubmission {
    pub election_id: u64,
    pub candidate_index: usize,
    pub account: Address,
    pub status: SubmissionStatus,
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
