use alloy_primitives::{U256, hex};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use vd_api_types::{
    Account, Candidate, ContractVariant, Election, ElectionId, TokenBalance, TxHash, TxReceipt,
};

use crate::{ContractError, ContractFeatures, ContractResult, VotingContract, format_token_amount, parse_token_amount};

#[derive(Debug, Default)]
struct StoredElection {
    title: String,
    is_open: bool,
    candidates: Vec<(String, u64)>,
    voters: HashSet<String>,
}

#[derive(Debug)]
struct Ledger {
    owner: Account,
    elections: Vec<StoredElection>,
    balances: HashMap<String, U256>,
    block: u64,
}

/// Contract kept in process memory, enforcing the same rules as the deployed
/// one: owner-only administration, one vote per account per election, votes
/// only while an election is open.
pub struct InMemoryVotingContract {
    ledger: RwLock<Ledger>,
}

impl InMemoryVotingContract {
    pub fn new(owner: Account) -> Self {
        Self {
            ledger: RwLock::new(Ledger {
                owner,
                elections: Vec::new(),
                balances: HashMap::new(),
                block: 0,
            }),
        }
    }
}

fn key(account: &Account) -> String {
    account.0.to_ascii_lowercase()
}

fn require_owner(ledger: &Ledger, from: &Account) -> ContractResult<()> {
    if ledger.owner.matches(from) {
        Ok(())
    } else {
        Err(ContractError::Reverted("caller is not the owner".to_owned()))
    }
}

fn election_mut(ledger: &mut Ledger, election: ElectionId) -> ContractResult<&mut StoredElection> {
    ledger
        .elections
        .get_mut(election.0 as usize)
        .ok_or_else(|| ContractError::Reverted(format!("election {election} does not exist")))
}

fn confirm(ledger: &mut Ledger, op: &str, from: &Account) -> TxReceipt {
    ledger.block += 1;
    let payload = format!("{}:{}:{}", ledger.block, op, key(from));
    let hash = Sha256::digest(payload.as_bytes());
    debug!(op, block = ledger.block, "in-memory transaction confirmed");
    TxReceipt {
        tx_hash: TxHash(hex::encode_prefixed(hash)),
        block_number: Some(ledger.block),
    }
}

#[async_trait(?Send)]
impl VotingContract for InMemoryVotingContract {
    fn variant(&self) -> ContractVariant {
        ContractVariant::InMemory
    }

    fn features(&self) -> ContractFeatures {
        ContractFeatures::all()
    }

    async fn list_elections(&self) -> ContractResult<Vec<Election>> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .elections
            .iter()
            .enumerate()
            .map(|(id, stored)| Election {
                id: ElectionId(id as u64),
                title: stored.title.clone(),
                is_open: stored.is_open,
            })
            .collect())
    }

    async fn candidates(&self, election: ElectionId) -> ContractResult<Vec<Candidate>> {
        let ledger = self.ledger.read().await;
        let stored = ledger
            .elections
            .get(election.0 as usize)
            .ok_or_else(|| ContractError::Reverted(format!("election {election} does not exist")))?;
        Ok(stored
            .candidates
            .iter()
            .enumerate()
            .map(|(index, (name, votes))| Candidate {
                index: index as u32,
                name: name.clone(),
                vote_count: *votes,
            })
            .collect())
    }

    async fn owner(&self) -> ContractResult<Account> {
        Ok(self.ledger.read().await.owner.clone())
    }

    async fn is_election_open(&self, election: ElectionId) -> ContractResult<bool> {
        let ledger = self.ledger.read().await;
        ledger
            .elections
            .get(election.0 as usize)
            .map(|stored| stored.is_open)
            .ok_or_else(|| ContractError::Reverted(format!("election {election} does not exist")))
    }

    async fn has_voted(&self, election: ElectionId, voter: &Account) -> ContractResult<Option<bool>> {
        let ledger = self.ledger.read().await;
        Ok(Some(
            ledger
                .elections
                .get(election.0 as usize)
                .is_some_and(|stored| stored.voters.contains(&key(voter))),
        ))
    }

    async fn token_balance(&self, account: &Account) -> ContractResult<TokenBalance> {
        let ledger = self.ledger.read().await;
        let amount = ledger.balances.get(&key(account)).copied().unwrap_or_default();
        Ok(TokenBalance {
            account: account.clone(),
            amount: format_token_amount(amount),
        })
    }

    async fn create_election(&self, from: &Account, title: &str) -> ContractResult<TxReceipt> {
        let mut ledger = self.ledger.write().await;
        require_owner(&ledger, from)?;
        ledger.elections.push(StoredElection {
            title: title.to_owned(),
            ..StoredElection::default()
        });
        Ok(confirm(&mut ledger, "createElection", from))
    }

    async fn add_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        name: &str,
    ) -> ContractResult<TxReceipt> {
        let mut ledger = self.ledger.write().await;
        require_owner(&ledger, from)?;
        let stored = election_mut(&mut ledger, election)?;
        if stored.candidates.iter().any(|(existing, _)| existing == name) {
            return Err(ContractError::Reverted(format!("candidate '{name}' already exists")));
        }
        stored.candidates.push((name.to_owned(), 0));
        Ok(confirm(&mut ledger, "addCandidate", from))
    }

    async fn remove_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt> {
        let mut ledger = self.ledger.write().await;
        require_owner(&ledger, from)?;
        let stored = election_mut(&mut ledger, election)?;
        if stored.is_open {
            return Err(ContractError::Reverted("election is open".to_owned()));
        }
        let before = stored.candidates.len();
        stored.candidates.retain(|(name, _)| name != &candidate.name);
        if stored.candidates.len() == before {
            return Err(ContractError::Reverted(format!("candidate '{}' not found", candidate.name)));
        }
        Ok(confirm(&mut ledger, "removeCandidate", from))
    }

    async fn set_election_status(
        &self,
        from: &Account,
        election: ElectionId,
        open: bool,
    ) -> ContractResult<TxReceipt> {
        let mut ledger = self.ledger.write().await;
        require_owner(&ledger, from)?;
        election_mut(&mut ledger, election)?.is_open = open;
        Ok(confirm(&mut ledger, "setElectionStatus", from))
    }

    async fn cast_vote(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt> {
        let mut ledger = self.ledger.write().await;
        let voter = key(from);
        let stored = election_mut(&mut ledger, election)?;
        if !stored.is_open {
            return Err(ContractError::Reverted("election is closed".to_owned()));
        }
        if stored.voters.contains(&voter) {
            return Err(ContractError::Reverted("already voted".to_owned()));
        }
        let Some(entry) = stored.candidates.get_mut(candidate.index as usize) else {
            return Err(ContractError::Reverted("invalid candidate".to_owned()));
        };
        entry.1 += 1;
        stored.voters.insert(voter);
        Ok(confirm(&mut ledger, "vote", from))
    }

    async fn mint_tokens(&self, from: &Account, to: &Account, amount: &str) -> ContractResult<TxReceipt> {
        let amount = parse_token_amount(amount)?;
        let mut ledger = self.ledger.write().await;
        require_owner(&ledger, from)?;
        *ledger.balances.entry(key(to)).or_default() += amount;
        Ok(confirm(&mut ledger, "mint", from))
    }

    async fn transfer_ownership(&self, from: &Account, new_owner: &Account) -> ContractResult<TxReceipt> {
        let mut ledger = self.ledger.write().await;
        require_owner(&ledger, from)?;
        ledger.owner = new_owner.clone();
        Ok(confirm(&mut ledger, "transferOwnership", from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Account {
        Account("0x00000000000000000000000000000000000000AA".to_owned())
    }

    fn voter() -> Account {
        Account("0x00000000000000000000000000000000000000bb".to_owned())
    }

    async fn open_election(contract: &InMemoryVotingContract) -> ElectionId {
        contract.create_election(&owner(), "Board 2026").await.unwrap();
        let id = ElectionId(0);
        contract.add_candidate(&owner(), id, "Ada").await.unwrap();
        contract.add_candidate(&owner(), id, "Grace").await.unwrap();
        contract.set_election_status(&owner(), id, true).await.unwrap();
        id
    }

    #[tokio::test]
    async fn only_owner_administers() {
        let contract = InMemoryVotingContract::new(owner());
        let err = contract.create_election(&voter(), "Rogue").await.unwrap_err();
        assert!(matches!(err, ContractError::Reverted(_)));

        let lowercase_owner = Account(owner().0.to_ascii_lowercase());
        contract.create_election(&lowercase_owner, "Board").await.unwrap();
        assert_eq!(contract.list_elections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn one_vote_per_account() {
        let contract = InMemoryVotingContract::new(owner());
        let id = open_election(&contract).await;
        let grace = contract.candidates(id).await.unwrap()[1].clone();

        assert_eq!(contract.has_voted(id, &voter()).await.unwrap(), Some(false));
        let receipt = contract.cast_vote(&voter(), id, &grace).await.unwrap();
        assert!(receipt.tx_hash.0.starts_with("0x"));
        assert_eq!(contract.has_voted(id, &voter()).await.unwrap(), Some(true));

        let again = contract.cast_vote(&voter(), id, &grace).await.unwrap_err();
        assert_eq!(again, ContractError::Reverted("already voted".to_owned()));
        assert_eq!(contract.candidates(id).await.unwrap()[1].vote_count, 1);
    }

    #[tokio::test]
    async fn closed_election_rejects_votes_and_open_rejects_removal() {
        let contract = InMemoryVotingContract::new(owner());
        let id = open_election(&contract).await;
        let ada = contract.candidates(id).await.unwrap()[0].clone();

        assert!(contract.remove_candidate(&owner(), id, &ada).await.is_err());
        contract.set_election_status(&owner(), id, false).await.unwrap();
        assert!(contract.cast_vote(&voter(), id, &ada).await.is_err());

        contract.remove_candidate(&owner(), id, &ada).await.unwrap();
        let names: Vec<_> = contract
            .candidates(id)
            .await
            .unwrap()
            .into_iter()
            .map(|candidate| candidate.name)
            .collect();
        assert_eq!(names, vec!["Grace".to_owned()]);
    }

    #[tokio::test]
    async fn mint_and_transfer_ownership() {
        let contract = InMemoryVotingContract::new(owner());
        contract.mint_tokens(&owner(), &voter(), "25").await.unwrap();
        contract.mint_tokens(&owner(), &voter(), "0.5").await.unwrap();
        assert_eq!(contract.token_balance(&voter()).await.unwrap().amount, "25.5");
        assert!(contract.mint_tokens(&owner(), &voter(), "-1").await.is_err());

        contract.transfer_ownership(&owner(), &voter()).await.unwrap();
        assert!(contract.owner().await.unwrap().matches(&voter()));
        assert!(contract.mint_tokens(&owner(), &owner(), "1").await.is_err());
    }
}
