pub mod client;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod phase;
pub mod rpc;
pub mod session;
pub mod store;
pub mod submit;
pub mod types;

pub use client::{ElectionClient, ElectionView};
pub use directory::DirectoryEntry;
pub use error::ClientError;
pub use gateway::{ElectionGateway, TransactionHandle};
pub use phase::{resolve_phase, Phase};
pub use session::{SessionManager, WalletAgent};
pub use types::{
    Address, Candidate, Election, ElectionSummary, NewElection, PendingSubmission, Receipt,
    SubmissionStatus,
};
