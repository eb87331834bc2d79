#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use election_client::types::unix_now;
use election_client::{
    Address, Candidate, ClientError, Election, ElectionClient, ElectionGateway, NewElection,
    Receipt, TransactionHandle, WalletAgent,
};

// === Wallet ===

pub struct WalletState {
    pub accounts: Vec<Address>,
    pub selected: Option<Address>,
    pub unreachable: bool,
}

#[derive(Clone)]
pub struct MockWallet {
    pub state: Arc<Mutex<WalletState>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>) -> Self {
        let selected = accounts.first().cloned();
        Self {
            state: Arc::new(Mutex::new(WalletState {
                accounts,
                selected,
                unreachable: false,
            })),
        }
    }

    pub fn unreachable() -> Self {
        let wallet = Self::new(Vec::new());
        wallet.state.lock().unwrap().unreachable = true;
        wallet
    }

    /// Simulates the user switching accounts in the wallet UI.
    pub fn select(&self, account: Option<Address>) {
        self.state.lock().unwrap().selected = account;
    }
}

#[async_trait]
impl WalletAgent for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(ClientError::WalletUnavailable);
        }
        Ok(state.accounts.clone())
    }

    async fn selected_account(&self) -> Result<Option<Address>, ClientError> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(ClientError::WalletUnavailable);
        }
        Ok(state.selected.clone())
    }
}

// === Gateway ===

#[derive(Clone)]
pub enum VoteOutcome {
    Confirm,
    Reverted(String),
    Underpriced,
}

pub struct GatewayState {
    pub elections: Vec<Election>,
    pub voted: HashSet<(u64, Address)>,
    /// Ids whose `get_election` fails with an injected network fault.
    pub broken: HashSet<u64>,
    pub vote_outcome: VoteOutcome,
    pub vote_calls: usize,
    pub create_calls: usize,
    pub has_voted_calls: usize,
    pub candidates_calls: usize,
}

pub struct MockGateway {
    pub state: Arc<Mutex<GatewayState>>,
    /// Signing binding shared with the wallet: a vote is signed under the
    /// account selected at submission time.
    wallet: Arc<Mutex<WalletState>>,
    /// When set, confirmations block until a permit is added.
    confirm_gate: Option<Arc<Semaphore>>,
}

impl MockGateway {
    pub fn new(elections: Vec<Election>, wallet: &MockWallet) -> Self {
        Self {
            state: Arc::new(Mutex::new(GatewayState {
                elections,
                voted: HashSet::new(),
                broken: HashSet::new(),
                vote_outcome: VoteOutcome::Confirm,
                vote_calls: 0,
                create_calls: 0,
                has_voted_calls: 0,
                candidates_calls: 0,
            })),
            wallet: Arc::clone(&wallet.state),
            confirm_gate: None,
        }
    }

    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.confirm_gate = Some(Arc::clone(&gate));
        (self, gate)
    }
}

enum Action {
    Vote { election_id: u64, candidate_index: usize },
    Create { params: NewElection },
}

pub struct MockHandle {
    state: Arc<Mutex<GatewayState>>,
    gate: Option<Arc<Semaphore>>,
    action: Action,
    account: Address,
    outcome: VoteOutcome,
    tx_hash: String,
}

#[async_trait]
impl TransactionHandle for MockHandle {
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    async fn await_confirmation(self) -> Result<Receipt, ClientError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("confirm gate closed").forget();
        }
        match self.outcome {
            VoteOutcome::Confirm => {
                let mut state = self.state.lock().unwrap();
                match self.action {
                    Action::Vote {
                        election_id,
                        candidate_index,
                    } => {
                        let election = &mut state.elections[election_id as usize];
                        election.candidates[candidate_index].vote_count += 1;
                        state.voted.insert((election_id, self.account));
                    }
                    Action::Create { params } => {
                        let id = state.elections.len() as u64;
                        state.elections.push(Election {
                            id,
                            title: params.title,
                            candidates: params
                                .candidates
                                .into_iter()
                                .map(|name| Candidate { name, vote_count: 0 })
                                .collect(),
                            start_time: params.start_time,
                            end_time: params.end_time,
                        });
                    }
                }
                Ok(Receipt {
                    tx_hash: self.tx_hash,
                    block_number: 1,
                })
            }
            VoteOutcome::Reverted(reason) => Err(ClientError::Reverted(reason)),
            VoteOutcome::Underpriced => Err(ClientError::Underpriced),
        }
    }
}

#[async_trait]
impl ElectionGateway for MockGateway {
    type Handle = MockHandle;

    async fn election_count(&self) -> Result<u64, ClientError> {
        Ok(self.state.lock().unwrap().elections.len() as u64)
    }

    async fn get_election(&self, id: u64) -> Result<Election, ClientError> {
        let state = self.state.lock().unwrap();
        if state.broken.contains(&id) {
            return Err(ClientError::NetworkUnreachable("injected fault".into()));
        }
        state
            .elections
            .get(id as usize)
            .cloned()
            .ok_or(ClientError::NotFound(id))
    }

    async fn get_candidates(&self, id: u64) -> Result<Vec<Candidate>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.candidates_calls += 1;
        state
            .elections
            .get(id as usize)
            .map(|e| e.candidates.clone())
            .ok_or(ClientError::NotFound(id))
    }

    async fn has_voted(&self, id: u64, account: &Address) -> Result<bool, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.has_voted_calls += 1;
        Ok(state.voted.contains(&(id, account.clone())))
    }

    async fn vote(&self, id: u64, candidate_index: usize) -> Result<Self::Handle, ClientError> {
        let account = self
            .wallet
            .lock()
            .unwrap()
            .selected
            .clone()
            .ok_or(ClientError::NoAccount)?;
        let mut state = self.state.lock().unwrap();
        state.vote_calls += 1;
        let tx_hash = format!("0xtx{:04}", state.vote_calls);
        Ok(MockHandle {
            state: Arc::clone(&self.state),
            gate: self.confirm_gate.clone(),
            action: Action::Vote {
                election_id: id,
                candidate_index,
            },
            account,
            outcome: state.vote_outcome.clone(),
            tx_hash,
        })
    }

    async fn create_election(&self, params: NewElection) -> Result<Self::Handle, ClientError> {
        let account = self
            .wallet
            .lock()
            .unwrap()
            .selected
            .clone()
            .ok_or(ClientError::NoAccount)?;
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        let tx_hash = format!("0xcreate{:04}", state.create_calls);
        Ok(MockHandle {
            state: Arc::clone(&self.state),
            gate: self.confirm_gate.clone(),
            action: Action::Create { params },
            account,
            outcome: VoteOutcome::Confirm,
            tx_hash,
        })
    }
}

// === Fixtures ===

pub fn election(id: u64, title: &str, start_time: u64, end_time: u64) -> Election {
    Election {
        id,
        title: title.to_string(),
        candidates: vec![
            Candidate { name: "Alice".into(), vote_count: 0 },
            Candidate { name: "Bob".into(), vote_count: 0 },
            Candidate { name: "Charlie".into(), vote_count: 0 },
        ],
        start_time,
        end_time,
    }
}

/// An election currently inside its voting window.
pub fn ongoing_election(id: u64, title: &str) -> Election {
    let now = unix_now();
    election(id, title, now - 10, now + 600)
}

pub fn addr(token: &str) -> Address {
    Address::new(token)
}

pub type TestClient = ElectionClient<MockGateway, MockWallet>;

/// Client over one ongoing three-candidate election with one wallet account.
pub fn single_election_client() -> (TestClient, Arc<Mutex<GatewayState>>, MockWallet) {
    let wallet = MockWallet::new(vec![addr("0xA11CE")]);
    let gateway = MockGateway::new(vec![ongoing_election(0, "Presidential Election")], &wallet);
    let state = Arc::clone(&gateway.state);
    (ElectionClient::new(gateway, wallet.clone()), state, wallet)
}

/// Same as [`single_election_client`] but confirmations block until the
/// returned gate receives a permit.
pub fn gated_client() -> (
    TestClient,
    Arc<Mutex<GatewayState>>,
    MockWallet,
    Arc<Semaphore>,
) {
    let wallet = MockWallet::new(vec![addr("0xA11CE"), addr("0xB0B")]);
    let (gateway, gate) =
        MockGateway::new(vec![ongoing_election(0, "Presidential Election")], &wallet).gated();
    let state = Arc::clone(&gateway.state);
    (ElectionClient::new(gateway, wallet.clone()), state, wallet, gate)
}
