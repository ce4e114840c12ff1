use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::debug;
use vd_api_types::{
    Account, Candidate, ContractVariant, Election, ElectionId, TokenBalance, TxReceipt,
};
use vd_contract_client::{
    ContractError, ContractFeatures, ContractResult, Eip1193Provider, VotingContract,
};

use crate::abi::IMultiElectionVoting as Abi;
use crate::{EvmConfig, EvmContract, to_account, to_address};

/// Gateway for the contract that hosts many elections addressed by index.
pub struct MultiElectionContract<P> {
    evm: EvmContract<P>,
}

impl<P> MultiElectionContract<P>
where
    P: Eip1193Provider,
{
    pub fn new(provider: P, config: EvmConfig) -> Self {
        Self {
            evm: EvmContract::new(provider, config),
        }
    }
}

fn id(election: ElectionId) -> U256 {
    U256::from(election.0)
}

pub(crate) fn to_u64(value: U256, what: &str) -> ContractResult<u64> {
    u64::try_from(value).map_err(|_| ContractError::Decode(format!("{what} {value} does not fit in u64")))
}

#[async_trait(?Send)]
impl<P> VotingContract for MultiElectionContract<P>
where
    P: Eip1193Provider,
{
    fn variant(&self) -> ContractVariant {
        ContractVariant::MultiElection
    }

    fn features(&self) -> ContractFeatures {
        ContractFeatures {
            multiple_elections: true,
            has_voted_query: true,
            ..ContractFeatures::default()
        }
    }

    async fn list_elections(&self) -> ContractResult<Vec<Election>> {
        let count = to_u64(self.evm.call(&Abi::electionCountCall {}).await?.count, "election count")?;
        debug!(count, "loading elections");

        let mut elections = Vec::with_capacity(count as usize);
        for index in 0..count {
            let election = ElectionId(index);
            let title = self
                .evm
                .call_leading(&Abi::electionsCall { id: id(election) })
                .await?
                .title;
            let is_open = self.is_election_open(election).await?;
            elections.push(Election {
                id: election,
                title,
                is_open,
            });
        }
        Ok(elections)
    }

    async fn candidates(&self, election: ElectionId) -> ContractResult<Vec<Candidate>> {
        let entries = self
            .evm
            .call(&Abi::getCandidatesCall { id: id(election) })
            .await?
            .candidates;
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Ok(Candidate {
                    index: index as u32,
                    name: entry.name,
                    vote_count: to_u64(entry.voteCount, "vote count")?,
                })
            })
            .collect()
    }

    async fn owner(&self) -> ContractResult<Account> {
        Ok(to_account(self.evm.call(&Abi::ownerCall {}).await?.account))
    }

    async fn is_election_open(&self, election: ElectionId) -> ContractResult<bool> {
        Ok(self
            .evm
            .call(&Abi::isElectionOpenCall { id: id(election) })
            .await?
            .open)
    }

    async fn has_voted(&self, election: ElectionId, voter: &Account) -> ContractResult<Option<bool>> {
        let call = Abi::hasVotedCall {
            id: id(election),
            voter: to_address(voter)?,
        };
        Ok(Some(self.evm.call(&call).await?.voted))
    }

    async fn token_balance(&self, _account: &Account) -> ContractResult<TokenBalance> {
        Err(ContractError::Unsupported("token balance"))
    }

    async fn create_election(&self, from: &Account, title: &str) -> ContractResult<TxReceipt> {
        self.evm
            .send(from, &Abi::createElectionCall { title: title.to_owned() })
            .await
    }

    async fn add_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        name: &str,
    ) -> ContractResult<TxReceipt> {
        let call = Abi::addCandidateCall {
            id: id(election),
            name: name.to_owned(),
        };
        self.evm.send(from, &call).await
    }

    async fn remove_candidate(
        &self,
        _from: &Account,
        _election: ElectionId,
        _candidate: &Candidate,
    ) -> ContractResult<TxReceipt> {
        Err(ContractError::Unsupported("removing candidates"))
    }

    async fn set_election_status(
        &self,
        from: &Account,
        election: ElectionId,
        open: bool,
    ) -> ContractResult<TxReceipt> {
        let call = Abi::setElectionStatusCall {
            id: id(election),
            open,
        };
        self.evm.send(from, &call).await
    }

    async fn cast_vote(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt> {
        let call = Abi::voteCall {
            id: id(election),
            candidateIndex: U256::from(candidate.index),
        };
        self.evm.send(from, &call).await
    }

    async fn mint_tokens(&self, _from: &Account, _to: &Account, _amount: &str) -> ContractResult<TxReceipt> {
        Err(ContractError::Unsupported("minting tokens"))
    }

    async fn transfer_ownership(&self, _from: &Account, _new_owner: &Account) -> ContractResult<TxReceipt> {
        Err(ContractError::Unsupported("ownership transfer"))
    }
}
