use thiserror::Error;

use crate::phase::Phase;

/// Every failure the client can surface. Validation and business-rule
/// variants are resolved locally before any network mutation; the
/// transaction-layer variants are reported by the gateway verbatim and are
/// never retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no wallet agent is reachable")]
    WalletUnavailable,
    #[error("wallet permission denied")]
    PermissionDenied,
    #[error("no account is bound to the session")]
    NoAccount,
    #[error("election {0} not found")]
    NotFound(u64),
    #[error("candidate index {index} out of range ({count} candidates)")]
    InvalidCandidate { index: usize, count: usize },
    #[error("account has already voted in election {0}")]
    AlreadyVoted(u64),
    #[error("a vote for election {0} is already in flight for this account")]
    AlreadyVoting(u64),
    #[error("election {id} is not open for voting ({phase})")]
    ElectionNotOpen { id: u64, phase: Phase },
    #[error("start time must precede end time")]
    InvalidSchedule,
    #[error("transaction reverted: {0}")]
    Reverted(String),
    #[error("transaction underpriced")]
    Underpriced,
    #[error("transaction confirmation timed out")]
    Timeout,
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("gateway returned an unusable response: {0}")]
    Rpc(String),
}

impl ClientError {
    /// True for the transaction-layer failures of a submitted action. These
    /// reach the caller unchanged; resubmitting could double-apply the vote.
    pub fn is_transaction_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Reverted(_)
                | ClientError::Underpriced
                | ClientError::Timeout
                | ClientError::NetworkUnreachable(_)
        )
    }
}
