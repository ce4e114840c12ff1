//! Root coordinator and page views.
//!
//! The coordinator owns the cross-page [`AppState`]; each view module builds a
//! render model from that state and adds the actions its page triggers.
//! Nothing here touches the DOM, so the browser front end only has to paint
//! the models and forward clicks.

pub mod admin;
pub mod coordinator;
pub mod nav;
pub mod notice;
pub mod results;
pub mod state;
pub mod vote;

pub use coordinator::Coordinator;
pub use notice::{Notice, NoticeLevel};
pub use state::{AppState, Page};

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;
    use vd_api_types::{
        Account, Candidate, ContractVariant, Election, ElectionId, TokenBalance, TxReceipt,
    };
    use vd_contract_client::{
        ContractError, ContractFeatures, ContractResult, Eip1193Provider, InMemoryVotingContract,
        VotingContract,
    };
    use vd_wallet::WalletConnector;

    use crate::Coordinator;

    pub const OWNER: &str = "0x00000000000000000000000000000000000000aa";
    pub const VOTER: &str = "0x00000000000000000000000000000000000000bb";

    pub fn owner() -> Account {
        Account(OWNER.to_owned())
    }

    /// Wallet that always authorises the same account.
    pub struct StaticWallet(pub &'static str);

    #[async_trait(?Send)]
    impl Eip1193Provider for StaticWallet {
        async fn request(&self, method: &str, _params: Value) -> ContractResult<Value> {
            match method {
                "eth_requestAccounts" => Ok(json!([self.0])),
                "eth_chainId" => Ok(json!("0x7a69")),
                other => Err(ContractError::Rpc(format!("{other} not scripted"))),
            }
        }

        async fn pause(&self, _duration: Duration) {}
    }

    /// In-memory contract whose reads can be switched off to simulate an
    /// unreachable node, and whose features can be narrowed.
    pub struct FlakyContract {
        pub inner: InMemoryVotingContract,
        pub reads_fail: Cell<bool>,
        pub features: ContractFeatures,
    }

    impl FlakyContract {
        fn read_guard(&self) -> ContractResult<()> {
            if self.reads_fail.get() {
                Err(ContractError::Rpc("connection refused".to_owned()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait(?Send)]
    impl VotingContract for FlakyContract {
        fn variant(&self) -> ContractVariant {
            ContractVariant::InMemory
        }

        fn features(&self) -> ContractFeatures {
            self.features
        }

        async fn list_elections(&self) -> ContractResult<Vec<Election>> {
            self.read_guard()?;
            self.inner.list_elections().await
        }

        async fn candidates(&self, election: ElectionId) -> ContractResult<Vec<Candidate>> {
            self.read_guard()?;
            self.inner.candidates(election).await
        }

        async fn owner(&self) -> ContractResult<Account> {
            self.read_guard()?;
            self.inner.owner().await
        }

        async fn is_election_open(&self, election: ElectionId) -> ContractResult<bool> {
            self.read_guard()?;
            self.inner.is_election_open(election).await
        }

        async fn has_voted(&self, election: ElectionId, voter: &Account) -> ContractResult<Option<bool>> {
            self.read_guard()?;
            if !self.features.has_voted_query {
                return Ok(None);
            }
            self.inner.has_voted(election, voter).await
        }

        async fn token_balance(&self, account: &Account) -> ContractResult<TokenBalance> {
            self.read_guard()?;
            self.inner.token_balance(account).await
        }

        async fn create_election(&self, from: &Account, title: &str) -> ContractResult<TxReceipt> {
            self.inner.create_election(from, title).await
        }

        async fn add_candidate(
            &self,
            from: &Account,
            election: ElectionId,
            name: &str,
        ) -> ContractResult<TxReceipt> {
            self.inner.add_candidate(from, election, name).await
        }

        async fn remove_candidate(
            &self,
            from: &Account,
            election: ElectionId,
            candidate: &Candidate,
        ) -> ContractResult<TxReceipt> {
            self.inner.remove_candidate(from, election, candidate).await
        }

        async fn set_election_status(
            &self,
            from: &Account,
            election: ElectionId,
            open: bool,
        ) -> ContractResult<TxReceipt> {
            self.inner.set_election_status(from, election, open).await
        }

        async fn cast_vote(
            &self,
            from: &Account,
            election: ElectionId,
            candidate: &Candidate,
        ) -> ContractResult<TxReceipt> {
            self.inner.cast_vote(from, election, candidate).await
        }

        async fn mint_tokens(&self, from: &Account, to: &Account, amount: &str) -> ContractResult<TxReceipt> {
            self.inner.mint_tokens(from, to, amount).await
        }

        async fn transfer_ownership(&self, from: &Account, new_owner: &Account) -> ContractResult<TxReceipt> {
            self.inner.transfer_ownership(from, new_owner).await
        }
    }

    pub struct Fixture {
        pub contract: Rc<FlakyContract>,
        pub app: Coordinator<StaticWallet>,
    }

    pub fn fixture_with(user: &'static str, features: ContractFeatures) -> Fixture {
        let contract = Rc::new(FlakyContract {
            inner: InMemoryVotingContract::new(owner()),
            reads_fail: Cell::new(false),
            features,
        });
        let wallet = WalletConnector::new(Some(StaticWallet(user)));
        let app = Coordinator::new(wallet, contract.clone());
        Fixture { contract, app }
    }

    pub fn fixture(user: &'static str) -> Fixture {
        fixture_with(user, ContractFeatures::all())
    }

    /// One open election "Board" with candidates Ada and Grace.
    pub async fn seed_open_election(contract: &FlakyContract) -> ElectionId {
        let id = ElectionId(contract.inner.list_elections().await.unwrap().len() as u64);
        contract.inner.create_election(&owner(), "Board").await.unwrap();
        contract.inner.add_candidate(&owner(), id, "Ada").await.unwrap();
        contract.inner.add_candidate(&owner(), id, "Grace").await.unwrap();
        contract.inner.set_election_status(&owner(), id, true).await.unwrap();
        id
    }
}
