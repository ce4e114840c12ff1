use alloy_primitives::hex;
use alloy_sol_types::SolCall;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use vd_api_types::{Account, TxHash, TxReceipt};
use vd_contract_client::{ContractError, ContractResult, Eip1193Provider};

use crate::EvmConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
}

/// `eth_call` / `eth_sendTransaction` plumbing shared by both gateways.
pub struct EvmContract<P> {
    provider: P,
    config: EvmConfig,
}

impl<P> EvmContract<P>
where
    P: Eip1193Provider,
{
    pub fn new(provider: P, config: EvmConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    pub async fn call<C: SolCall>(&self, call: &C) -> ContractResult<C::Return> {
        self.call_with(call, true).await
    }

    /// Like [`call`](Self::call), but only the declared leading return values
    /// are decoded; trailing fields the contract returns beyond them are
    /// ignored. Used for struct getters where just the first member is needed.
    pub async fn call_leading<C: SolCall>(&self, call: &C) -> ContractResult<C::Return> {
        self.call_with(call, false).await
    }

    async fn call_with<C: SolCall>(&self, call: &C, validate: bool) -> ContractResult<C::Return> {
        let params = json!([
            {
                "to": self.config.contract_address.to_string(),
                "data": hex::encode_prefixed(call.abi_encode()),
            },
            "latest"
        ]);
        let result = self.provider.request("eth_call", params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ContractError::Decode(format!("{} returned {result}", C::SIGNATURE)))?;
        let bytes = hex::decode(raw)
            .map_err(|err| ContractError::Decode(format!("{} returned bad hex: {err}", C::SIGNATURE)))?;
        C::abi_decode_returns(&bytes, validate)
            .map_err(|err| ContractError::Decode(format!("{}: {err}", C::SIGNATURE)))
    }

    /// Submit a transaction from `from` and wait for it to be mined.
    pub async fn send<C: SolCall>(&self, from: &Account, call: &C) -> ContractResult<TxReceipt> {
        let params = json!([{
            "from": from.0,
            "to": self.config.contract_address.to_string(),
            "data": hex::encode_prefixed(call.abi_encode()),
        }]);
        let result = self.provider.request("eth_sendTransaction", params).await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| ContractError::Decode(format!("eth_sendTransaction returned {result}")))?
            .to_owned();
        info!(method = C::SIGNATURE, %tx_hash, "transaction submitted");
        self.wait_for_receipt(tx_hash).await
    }

    async fn wait_for_receipt(&self, tx_hash: String) -> ContractResult<TxReceipt> {
        for attempt in 0..self.config.max_receipt_polls {
            let value = self
                .provider
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if value.is_null() {
                debug!(%tx_hash, attempt, "receipt not yet available");
                self.provider.pause(self.config.receipt_poll_interval).await;
                continue;
            }

            let receipt: RpcReceipt = serde_json::from_value(value)
                .map_err(|err| ContractError::Decode(format!("receipt for {tx_hash}: {err}")))?;
            if receipt.status.as_deref() == Some("0x0") {
                warn!(%tx_hash, "transaction reverted");
                return Err(ContractError::Reverted(format!("transaction {tx_hash} failed on-chain")));
            }
            let block_number = receipt.block_number.as_deref().and_then(parse_quantity);
            info!(%tx_hash, ?block_number, "transaction confirmed");
            return Ok(TxReceipt {
                tx_hash: TxHash(tx_hash),
                block_number,
            });
        }

        Err(ContractError::Rpc(format!(
            "no receipt for {tx_hash} after {} polls",
            self.config.max_receipt_polls
        )))
    }
}

fn parse_quantity(raw: &str) -> Option<u64> {
    u64::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::IMultiElectionVoting;
    use crate::testing::{ScriptedProvider, hex_value};
    use alloy_primitives::U256;
    use alloy_sol_types::SolValue;

    fn contract(provider: ScriptedProvider) -> EvmContract<ScriptedProvider> {
        let config = EvmConfig::for_variant(vd_api_types::ContractVariant::MultiElection, None).unwrap();
        EvmContract::new(provider, config)
    }

    #[tokio::test]
    async fn call_encodes_selector_and_decodes_return() {
        let provider = ScriptedProvider::default();
        provider.respond(hex_value(U256::from(3u64).abi_encode()));
        let contract = contract(provider);

        let ret = contract.call(&IMultiElectionVoting::electionCountCall {}).await.unwrap();
        assert_eq!(ret.count, U256::from(3u64));

        let requests = contract.provider.requests.borrow();
        let (method, params) = &requests[0];
        assert_eq!(method, "eth_call");
        assert_eq!(
            params[0]["data"].as_str().unwrap(),
            hex::encode_prefixed(IMultiElectionVoting::electionCountCall::SELECTOR)
        );
        assert_eq!(params[1], "latest");
    }

    #[tokio::test]
    async fn extra_return_fields_fail_strict_decoding_only() {
        let provider = ScriptedProvider::default();
        let struct_reply = ("Board".to_owned(), true).abi_encode_params();
        provider
            .respond(hex_value(struct_reply.clone()))
            .respond(hex_value(struct_reply));
        let contract = contract(provider);
        let call = IMultiElectionVoting::electionsCall { id: U256::ZERO };

        assert!(matches!(contract.call(&call).await, Err(ContractError::Decode(_))));
        assert_eq!(contract.call_leading(&call).await.unwrap().title, "Board");
    }

    #[tokio::test]
    async fn send_polls_until_receipt_appears() {
        let provider = ScriptedProvider::default();
        provider
            .respond(Ok(json!("0xfeed")))
            .respond(Ok(Value::Null))
            .respond(Ok(Value::Null))
            .respond(Ok(json!({ "status": "0x1", "blockNumber": "0x1a" })));
        let contract = contract(provider);
        let from = Account("0x00000000000000000000000000000000000000aa".to_owned());

        let receipt = contract
            .send(&from, &IMultiElectionVoting::createElectionCall { title: "Board".into() })
            .await
            .unwrap();
        assert_eq!(receipt.tx_hash, TxHash("0xfeed".to_owned()));
        assert_eq!(receipt.block_number, Some(26));
        assert_eq!(
            contract.provider.methods(),
            vec![
                "eth_sendTransaction",
                "eth_getTransactionReceipt",
                "eth_getTransactionReceipt",
                "eth_getTransactionReceipt"
            ]
        );
    }

    #[tokio::test]
    async fn failed_receipt_is_a_revert() {
        let provider = ScriptedProvider::default();
        provider
            .respond(Ok(json!("0xbad")))
            .respond(Ok(json!({ "status": "0x0", "blockNumber": "0x2" })));
        let contract = contract(provider);
        let from = Account("0x00000000000000000000000000000000000000aa".to_owned());

        let err = contract
            .send(&from, &IMultiElectionVoting::voteCall { id: U256::ZERO, candidateIndex: U256::ZERO })
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Reverted(_)));
    }

    #[tokio::test]
    async fn wallet_rejection_is_passed_through() {
        let provider = ScriptedProvider::default();
        provider.respond(Err(ContractError::from_rpc(4001, "User denied transaction signature")));
        let contract = contract(provider);
        let from = Account("0x00000000000000000000000000000000000000aa".to_owned());

        let err = contract
            .send(&from, &IMultiElectionVoting::createElectionCall { title: "Board".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::UserRejected(_)));
        assert_eq!(contract.provider.methods(), vec!["eth_sendTransaction"]);
    }

    #[tokio::test]
    async fn receipt_polling_gives_up() {
        let provider = ScriptedProvider::default();
        provider.respond(Ok(json!("0xslow")));
        for _ in 0..2 {
            provider.respond(Ok(Value::Null));
        }
        let mut contract = contract(provider);
        contract.config.max_receipt_polls = 2;
        let from = Account("0x00000000000000000000000000000000000000aa".to_owned());

        let err = contract
            .send(&from, &IMultiElectionVoting::createElectionCall { title: "Board".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Rpc(_)));
    }
}
