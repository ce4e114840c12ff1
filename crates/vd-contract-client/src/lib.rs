use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;
use vd_api_types::{
    Account, Candidate, ContractVariant, Election, ElectionId, TokenBalance, TxReceipt,
};

mod memory;
mod units;

pub use memory::InMemoryVotingContract;
pub use units::{format_token_amount, parse_token_amount};

/// EIP-1193 code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC code most nodes use for `execution reverted`.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// Everything that can go wrong between a user action and the contract.
///
/// The `Display` text is what ends up in front of the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("no wallet extension detected; install a wallet such as MetaMask to continue")]
    WalletUnavailable,
    #[error("request rejected in wallet: {0}")]
    UserRejected(String),
    #[error("transaction reverted: {0}")]
    Reverted(String),
    #[error("network error: {0}")]
    Rpc(String),
    #[error("unexpected contract response: {0}")]
    Decode(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} is not offered by this contract")]
    Unsupported(&'static str),
}

impl ContractError {
    /// Classify a JSON-RPC / provider error object.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        if code == USER_REJECTED_CODE {
            return ContractError::UserRejected(message.to_owned());
        }
        if code == EXECUTION_REVERTED_CODE || message.to_ascii_lowercase().contains("revert") {
            return ContractError::Reverted(message.to_owned());
        }
        ContractError::Rpc(format!("{message} (code {code})"))
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Wallet-injected (or node) provider speaking EIP-1193 `request`.
#[async_trait(?Send)]
pub trait Eip1193Provider {
    async fn request(&self, method: &str, params: Value) -> ContractResult<Value>;

    /// Suspend between receipt polls.
    async fn pause(&self, duration: Duration);
}

#[async_trait(?Send)]
impl<P> Eip1193Provider for Rc<P>
where
    P: Eip1193Provider + ?Sized,
{
    async fn request(&self, method: &str, params: Value) -> ContractResult<Value> {
        (**self).request(method, params).await
    }

    async fn pause(&self, duration: Duration) {
        (**self).pause(duration).await
    }
}

/// Which optional operations a gateway can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractFeatures {
    pub multiple_elections: bool,
    pub has_voted_query: bool,
    pub remove_candidate: bool,
    pub token_balance: bool,
    pub mint_tokens: bool,
    pub transfer_ownership: bool,
}

impl ContractFeatures {
    pub fn all() -> Self {
        Self {
            multiple_elections: true,
            has_voted_query: true,
            remove_candidate: true,
            token_balance: true,
            mint_tokens: true,
            transfer_ownership: true,
        }
    }
}

/// The contract as seen by the views: reads return current state, writes
/// resolve once the transaction is confirmed.
#[async_trait(?Send)]
pub trait VotingContract {
    fn variant(&self) -> ContractVariant;
    fn features(&self) -> ContractFeatures;

    async fn list_elections(&self) -> ContractResult<Vec<Election>>;
    async fn candidates(&self, election: ElectionId) -> ContractResult<Vec<Candidate>>;
    async fn owner(&self) -> ContractResult<Account>;
    async fn is_election_open(&self, election: ElectionId) -> ContractResult<bool>;
    /// `None` when the contract keeps no queryable vote record.
    async fn has_voted(&self, election: ElectionId, voter: &Account) -> ContractResult<Option<bool>>;
    async fn token_balance(&self, account: &Account) -> ContractResult<TokenBalance>;

    async fn create_election(&self, from: &Account, title: &str) -> ContractResult<TxReceipt>;
    async fn add_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        name: &str,
    ) -> ContractResult<TxReceipt>;
    async fn remove_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt>;
    async fn set_election_status(
        &self,
        from: &Account,
        election: ElectionId,
        open: bool,
    ) -> ContractResult<TxReceipt>;
    async fn cast_vote(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt>;
    /// `amount` is in whole tokens.
    async fn mint_tokens(&self, from: &Account, to: &Account, amount: &str) -> ContractResult<TxReceipt>;
    async fn transfer_ownership(&self, from: &Account, new_owner: &Account) -> ContractResult<TxReceipt>;
}
