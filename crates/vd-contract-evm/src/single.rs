use async_trait::async_trait;
use vd_api_types::{
    Account, Candidate, ContractVariant, Election, ElectionId, TokenBalance, TxReceipt,
};
use vd_contract_client::{
    ContractError, ContractFeatures, ContractResult, Eip1193Provider, VotingContract,
    format_token_amount, parse_token_amount,
};

use crate::abi::ISingleElectionVoting as Abi;
use crate::multi::to_u64;
use crate::{EvmConfig, EvmContract, to_account, to_address};

/// The single election this contract runs at any time.
pub const CURRENT_ELECTION: ElectionId = ElectionId(0);

/// Gateway for the token-backed contract that runs one election at a time.
///
/// Candidates are addressed by name and the contract keeps no queryable vote
/// record, so `has_voted` reports `None`.
pub struct SingleElectionContract<P> {
    evm: EvmContract<P>,
}

impl<P> SingleElectionContract<P>
where
    P: Eip1193Provider,
{
    pub fn new(provider: P, config: EvmConfig) -> Self {
        Self {
            evm: EvmContract::new(provider, config),
        }
    }
}

fn ensure_current(election: ElectionId) -> ContractResult<()> {
    if election == CURRENT_ELECTION {
        Ok(())
    } else {
        Err(ContractError::Unsupported("elections other than the current one"))
    }
}

#[async_trait(?Send)]
impl<P> VotingContract for SingleElectionContract<P>
where
    P: Eip1193Provider,
{
    fn variant(&self) -> ContractVariant {
        ContractVariant::SingleElection
    }

    fn features(&self) -> ContractFeatures {
        ContractFeatures {
            remove_candidate: true,
            token_balance: true,
            mint_tokens: true,
            transfer_ownership: true,
            ..ContractFeatures::default()
        }
    }

    async fn list_elections(&self) -> ContractResult<Vec<Election>> {
        let title = self.evm.call(&Abi::nombreEleccionActualCall {}).await?.name;
        let is_open = self.is_election_open(CURRENT_ELECTION).await?;
        Ok(vec![Election {
            id: CURRENT_ELECTION,
            title,
            is_open,
        }])
    }

    async fn candidates(&self, election: ElectionId) -> ContractResult<Vec<Candidate>> {
        ensure_current(election)?;
        let results = self.evm.call(&Abi::obtenerResultadosCall {}).await?;
        if results.names.len() != results.votes.len() {
            return Err(ContractError::Decode(format!(
                "{} candidates but {} vote counts",
                results.names.len(),
                results.votes.len()
            )));
        }
        results
            .names
            .into_iter()
            .zip(results.votes)
            .enumerate()
            .map(|(index, (name, votes))| {
                Ok(Candidate {
                    index: index as u32,
                    name,
                    vote_count: to_u64(votes, "vote count")?,
                })
            })
            .collect()
    }

    async fn owner(&self) -> ContractResult<Account> {
        Ok(to_account(self.evm.call(&Abi::ownerCall {}).await?.account))
    }

    async fn is_election_open(&self, election: ElectionId) -> ContractResult<bool> {
        ensure_current(election)?;
        Ok(self.evm.call(&Abi::votacionActivaCall {}).await?.active)
    }

    async fn has_voted(&self, election: ElectionId, _voter: &Account) -> ContractResult<Option<bool>> {
        ensure_current(election)?;
        Ok(None)
    }

    async fn token_balance(&self, account: &Account) -> ContractResult<TokenBalance> {
        let call = Abi::balanceOfCall {
            account: to_address(account)?,
        };
        let balance = self.evm.call(&call).await?.balance;
        Ok(TokenBalance {
            account: account.clone(),
            amount: format_token_amount(balance),
        })
    }

    async fn create_election(&self, from: &Account, title: &str) -> ContractResult<TxReceipt> {
        self.evm
            .send(from, &Abi::iniciarNuevaEleccionCall { name: title.to_owned() })
            .await
    }

    async fn add_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        name: &str,
    ) -> ContractResult<TxReceipt> {
        ensure_current(election)?;
        self.evm
            .send(from, &Abi::agregarCandidatoCall { name: name.to_owned() })
            .await
    }

    async fn remove_candidate(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt> {
        ensure_current(election)?;
        self.evm
            .send(from, &Abi::eliminarCandidatoCall { name: candidate.name.clone() })
            .await
    }

    async fn set_election_status(
        &self,
        from: &Account,
        election: ElectionId,
        open: bool,
    ) -> ContractResult<TxReceipt> {
        ensure_current(election)?;
        self.evm
            .send(from, &Abi::activarVotacionCall { active: open })
            .await
    }

    async fn cast_vote(
        &self,
        from: &Account,
        election: ElectionId,
        candidate: &Candidate,
    ) -> ContractResult<TxReceipt> {
        ensure_current(election)?;
        self.evm
            .send(from, &Abi::emitirVotoCall { candidate: candidate.name.clone() })
            .await
    }

    async fn mint_tokens(&self, from: &Account, to: &Account, amount: &str) -> ContractResult<TxReceipt> {
        let amount = parse_token_amount(amount)?;
        let call = Abi::mintCall {
            to: to_address(to)?,
            amount,
        };
        self.evm.send(from, &call).await
    }

    async fn transfer_ownership(&self, from: &Account, new_owner: &Account) -> ContractResult<TxReceipt> {
        let call = Abi::transferirPropiedadCall {
            newOwner: to_address(new_owner)?,
        };
        self.evm.send(from, &call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, hex_value};
    use alloy_primitives::{U256, hex};
    use alloy_sol_types::{SolCall, SolValue};
    use serde_json::json;
    use std::rc::Rc;

    fn gateway() -> (Rc<ScriptedProvider>, SingleElectionContract<Rc<ScriptedProvider>>) {
        let provider = Rc::new(ScriptedProvider::default());
        let config = EvmConfig::for_variant(
            ContractVariant::SingleElection,
            Some("0x00000000000000000000000000000000000000c1"),
        )
        .unwrap();
        (provider.clone(), SingleElectionContract::new(provider, config))
    }

    #[tokio::test]
    async fn exposes_current_election_as_id_zero() {
        let (provider, gateway) = gateway();
        provider
            .respond(hex_value("Consejo 2026".to_owned().abi_encode()))
            .respond(hex_value(true.abi_encode()));

        let elections = gateway.list_elections().await.unwrap();
        assert_eq!(
            elections,
            vec![Election { id: CURRENT_ELECTION, title: "Consejo 2026".into(), is_open: true }]
        );
        assert!(gateway.candidates(ElectionId(3)).await.is_err());
    }

    #[tokio::test]
    async fn zips_results_into_candidates() {
        let (provider, gateway) = gateway();
        let names = vec!["Ada".to_owned(), "Grace".to_owned()];
        let votes = vec![U256::from(2u64), U256::from(5u64)];
        provider.respond(hex_value((names, votes).abi_encode_params()));

        let candidates = gateway.candidates(CURRENT_ELECTION).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1], Candidate { index: 1, name: "Grace".into(), vote_count: 5 });
    }

    #[tokio::test]
    async fn has_voted_is_not_queryable() {
        let (provider, gateway) = gateway();
        let voter = Account("0x00000000000000000000000000000000000000bb".into());
        assert_eq!(gateway.has_voted(CURRENT_ELECTION, &voter).await.unwrap(), None);
        assert!(provider.methods().is_empty());
    }

    #[tokio::test]
    async fn balance_is_formatted_in_whole_tokens() {
        let (provider, gateway) = gateway();
        let wei = U256::from(12_500_000_000_000_000_000u128);
        provider.respond(hex_value(wei.abi_encode()));
        let voter = Account("0x00000000000000000000000000000000000000bb".into());

        let balance = gateway.token_balance(&voter).await.unwrap();
        assert_eq!(balance.amount, "12.5");
    }

    #[tokio::test]
    async fn mint_converts_tokens_to_wei() {
        let (provider, gateway) = gateway();
        provider
            .respond(Ok(json!("0x02")))
            .respond(Ok(json!({ "status": "0x1", "blockNumber": "0x9" })));
        let owner = Account("0x00000000000000000000000000000000000000aa".into());
        let to = Account("0x00000000000000000000000000000000000000bb".into());

        gateway.mint_tokens(&owner, &to, "100").await.unwrap();

        let requests = provider.requests.borrow();
        let expected = Abi::mintCall {
            to: "0x00000000000000000000000000000000000000bb".parse().unwrap(),
            amount: U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64)),
        }
        .abi_encode();
        assert_eq!(requests[0].1[0]["data"].as_str().unwrap(), hex::encode_prefixed(expected));
    }

    #[tokio::test]
    async fn negative_mint_never_reaches_the_wallet() {
        let (provider, gateway) = gateway();
        let owner = Account("0x00000000000000000000000000000000000000aa".into());
        let to = Account("0x00000000000000000000000000000000000000bb".into());

        let err = gateway.mint_tokens(&owner, &to, "-100").await.unwrap_err();
        assert!(matches!(err, ContractError::InvalidInput(_)));
        assert!(provider.methods().is_empty());
    }
}
