//! EVM gateways for the voting contract.
//!
//! Two ABI flavours are deployed in the wild and neither is canonical, so
//! each gets its own gateway and the caller picks one by configuration.

use alloy_primitives::Address;
use anyhow::{Context, Result, anyhow};
use std::rc::Rc;
use std::time::Duration;
use vd_api_types::{Account, ContractVariant};
use vd_contract_client::{ContractError, ContractResult, Eip1193Provider, VotingContract};

pub mod abi;
mod multi;
mod rpc;
mod single;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpProvider;
pub use multi::MultiElectionContract;
pub use rpc::EvmContract;
pub use single::SingleElectionContract;

/// Address shipped with the multi-election front end.
pub const MULTI_ELECTION_DEFAULT_ADDRESS: &str = "0x14ed3b64dc9db3802f482464051ba614bac4200e";

pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_500;
pub const DEFAULT_MAX_RECEIPT_POLLS: u32 = 120;

#[derive(Debug, Clone)]
pub struct EvmConfig {
    pub contract_address: Address,
    pub receipt_poll_interval: Duration,
    pub max_receipt_polls: u32,
}

impl EvmConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            receipt_poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
            max_receipt_polls: DEFAULT_MAX_RECEIPT_POLLS,
        }
    }

    /// Build a config for `variant`, falling back to the variant's known
    /// deployment when no address is given.
    pub fn for_variant(variant: ContractVariant, address: Option<&str>) -> Result<Self> {
        let address = match address.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => value.to_owned(),
            None => match variant {
                ContractVariant::MultiElection => MULTI_ELECTION_DEFAULT_ADDRESS.to_owned(),
                ContractVariant::SingleElection => {
                    return Err(anyhow!("a contract address is required for the single-election variant"));
                }
                ContractVariant::InMemory => {
                    return Err(anyhow!("the in-memory variant has no contract address"));
                }
            },
        };
        let contract_address: Address = address
            .parse()
            .with_context(|| format!("invalid contract address '{address}'"))?;
        Ok(Self::new(contract_address))
    }

    /// Reads `VOTEDESK_CONTRACT_ADDRESS` and `VOTEDESK_RECEIPT_POLL_MS`.
    pub fn from_env(variant: ContractVariant) -> Result<Self> {
        let address = std::env::var("VOTEDESK_CONTRACT_ADDRESS").ok();
        let mut config = Self::for_variant(variant, address.as_deref())?;
        if let Ok(raw) = std::env::var("VOTEDESK_RECEIPT_POLL_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("VOTEDESK_RECEIPT_POLL_MS must be a number, got '{raw}'"))?;
            config.receipt_poll_interval = Duration::from_millis(millis);
        }
        Ok(config)
    }
}

/// `VOTEDESK_VARIANT`, defaulting to the multi-election ABI.
pub fn variant_from_env() -> Result<ContractVariant> {
    match std::env::var("VOTEDESK_VARIANT") {
        Ok(raw) => ContractVariant::parse(&raw).ok_or_else(|| anyhow!("unknown VOTEDESK_VARIANT '{raw}'")),
        Err(_) => Ok(ContractVariant::MultiElection),
    }
}

/// Gateway for `variant` over `provider`.
pub fn connect<P>(provider: P, variant: ContractVariant, config: EvmConfig) -> Result<Rc<dyn VotingContract>>
where
    P: Eip1193Provider + 'static,
{
    let gateway: Rc<dyn VotingContract> = match variant {
        ContractVariant::MultiElection => Rc::new(MultiElectionContract::new(provider, config)),
        ContractVariant::SingleElection => Rc::new(SingleElectionContract::new(provider, config)),
        ContractVariant::InMemory => {
            return Err(anyhow!("the in-memory contract has no EVM gateway"));
        }
    };
    Ok(gateway)
}

/// Gateway for a node reached over HTTP, configured from `VOTEDESK_*`
/// environment variables.
#[cfg(feature = "http")]
pub fn connect_from_env() -> Result<Rc<dyn VotingContract>> {
    let variant = variant_from_env()?;
    let provider = HttpProvider::default();
    tracing::info!(variant = variant.as_str(), endpoint = provider.endpoint(), "connecting to contract");
    let config = EvmConfig::from_env(variant)?;
    connect(provider, variant, config)
}

pub(crate) fn to_address(account: &Account) -> ContractResult<Address> {
    account
        .0
        .parse()
        .map_err(|_| ContractError::Decode(format!("'{}' is not an address", account.0)))
}

pub(crate) fn to_account(address: Address) -> Account {
    Account(address.to_string())
}
