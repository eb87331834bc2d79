//! JSON-RPC binding for the gateway and wallet surfaces
//!
//! The contract ABI itself is out of scope; this module speaks to a
//! wallet-bridge endpoint that exposes the election contract's operations
//! and the wallet's account surface as JSON-RPC 2.0 methods over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ClientError;
use crate::gateway::{ElectionGateway, TransactionHandle};
use crate::session::WalletAgent;
use crate::types::{Address, Candidate, Election, NewElection, Receipt};

/// EIP-1193: the user rejected the request.
const CODE_USER_REJECTED: i64 = 4001;
/// EIP-1193: the requested method/account is not authorized.
const CODE_UNAUTHORIZED: i64 = 4100;
/// Requested resource does not exist.
const CODE_NOT_FOUND: i64 = -32001;

const DEFAULT_CONFIRMATION_POLL: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// A call that failed either in transport or at the remote end.
#[derive(Debug)]
enum CallError {
    Transport(String),
    Remote { code: i64, message: String },
}

impl CallError {
    /// Maps remote failures onto the client taxonomy. `NotFound` carries an
    /// election id, so callers that can name one translate [`CODE_NOT_FOUND`]
    /// themselves before falling back here.
    fn into_client(self) -> ClientError {
        match self {
            CallError::Transport(msg) => ClientError::NetworkUnreachable(msg),
            CallError::Remote { code, message } => {
                let lowered = message.to_lowercase();
                match code {
                    CODE_USER_REJECTED | CODE_UNAUTHORIZED => ClientError::PermissionDenied,
                    _ if lowered.contains("revert") => ClientError::Reverted(message),
                    _ if lowered.contains("underpriced") => ClientError::Underpriced,
                    _ if lowered.contains("timeout") || lowered.contains("timed out") => {
                        ClientError::Timeout
                    }
                    _ => ClientError::Rpc(format!("{} (code {})", message, code)),
                }
            }
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, CallError::Remote { code, .. } if *code == CODE_NOT_FOUND)
    }
}

/// Minimal JSON-RPC 2.0 client over HTTP.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, CallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc call");

        let envelope: RpcEnvelope = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(CallError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        let result = envelope.result.unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|e| CallError::Transport(format!("malformed result for {}: {}", method, e)))
    }
}

/// Gateway surface bound to a JSON-RPC endpoint.
pub struct RpcGateway {
    rpc: Arc<RpcClient>,
    confirmation_poll: Duration,
}

impl RpcGateway {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self {
            rpc,
            confirmation_poll: DEFAULT_CONFIRMATION_POLL,
        }
    }

    pub fn with_confirmation_poll(mut self, interval: Duration) -> Self {
        self.confirmation_poll = interval;
        self
    }

    fn map_not_found(err: CallError, id: u64) -> ClientError {
        if err.is_not_found() {
            ClientError::NotFound(id)
        } else {
            err.into_client()
        }
    }
}

#[async_trait]
impl ElectionGateway for RpcGateway {
    type Handle = RpcTransactionHandle;

    async fn election_count(&self) -> Result<u64, ClientError> {
        self.rpc
            .call("election_count", json!([]))
            .await
            .map_err(CallError::into_client)
    }

    async fn get_election(&self, id: u64) -> Result<Election, ClientError> {
        self.rpc
            .call("election_get", json!([id]))
            .await
            .map_err(|e| Self::map_not_found(e, id))
    }

    async fn get_candidates(&self, id: u64) -> Result<Vec<Candidate>, ClientError> {
        self.rpc
            .call("election_candidates", json!([id]))
            .await
            .map_err(|e| Self::map_not_found(e, id))
    }

    async fn has_voted(&self, id: u64, account: &Address) -> Result<bool, ClientError> {
        self.rpc
            .call("election_hasVoted", json!([id, account.as_str()]))
            .await
            .map_err(|e| Self::map_not_found(e, id))
    }

    async fn vote(&self, id: u64, candidate_index: usize) -> Result<Self::Handle, ClientError> {
        let tx_hash: String = self
            .rpc
            .call("election_castVote", json!([id, candidate_index]))
            .await
            .map_err(|e| Self::map_not_found(e, id))?;
        Ok(RpcTransactionHandle {
            rpc: Arc::clone(&self.rpc),
            tx_hash,
            poll_interval: self.confirmation_poll,
        })
    }

    async fn create_election(&self, params: NewElection) -> Result<Self::Handle, ClientError> {
        let tx_hash: String = self
            .rpc
            .call(
                "election_create",
                json!([params.title, params.candidates, params.start_time, params.end_time]),
            )
            .await
            .map_err(CallError::into_client)?;
        Ok(RpcTransactionHandle {
            rpc: Arc::clone(&self.rpc),
            tx_hash,
            poll_interval: self.confirmation_poll,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TxStatusBody {
    status: String,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// Submitted transaction tracked by hash. Confirmation is a poll loop with
/// no client-side deadline; dropping the future abandons the wait without
/// cancelling the already-submitted action.
pub struct RpcTransactionHandle {
    rpc: Arc<RpcClient>,
    tx_hash: String,
    poll_interval: Duration,
}

#[async_trait]
impl TransactionHandle for RpcTransactionHandle {
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    async fn await_confirmation(self) -> Result<Receipt, ClientError> {
        loop {
            let status: TxStatusBody = self
                .rpc
                .call("election_txReceipt", json!([self.tx_hash]))
                .await
                .map_err(CallError::into_client)?;

            match status.status.as_str() {
                "pending" => tokio::time::sleep(self.poll_interval).await,
                "confirmed" => {
                    return Ok(Receipt {
                        tx_hash: self.tx_hash,
                        block_number: status.block_number.unwrap_or(0),
                    });
                }
                "failed" => {
                    let reason = status.error.unwrap_or_else(|| "execution failed".to_string());
                    let lowered = reason.to_lowercase();
                    return Err(if lowered.contains("underpriced") {
                        ClientError::Underpriced
                    } else if lowered.contains("timeout") || lowered.contains("timed out") {
                        ClientError::Timeout
                    } else {
                        ClientError::Reverted(reason)
                    });
                }
                other => {
                    return Err(ClientError::Rpc(format!(
                        "unknown transaction status '{}'",
                        other
                    )));
                }
            }
        }
    }
}

/// Wallet surface bound to the same JSON-RPC endpoint.
pub struct RpcWallet {
    rpc: Arc<RpcClient>,
}

impl RpcWallet {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl WalletAgent for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let accounts: Vec<String> = self
            .rpc
            .call("wallet_requestAccounts", json!([]))
            .await
            .map_err(|e| match e {
                // An unreachable endpoint means no wallet agent at all.
                CallError::Transport(_) => ClientError::WalletUnavailable,
                remote => remote.into_client(),
            })?;
        Ok(accounts.into_iter().map(Address::new).collect())
    }

    async fn selected_account(&self) -> Result<Option<Address>, ClientError> {
        let selected: Option<String> = self
            .rpc
            .call("wallet_selectedAccount", json!([]))
            .await
            .map_err(|e| match e {
                CallError::Transport(_) => ClientError::WalletUnavailable,
                remote => remote.into_client(),
            })?;
        Ok(selected.map(Address::new))
    }
}
