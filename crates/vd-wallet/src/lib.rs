use alloy_primitives::{Address, hex};
use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::cell::RefCell;
use tracing::{info, warn};
use vd_api_types::Account;
use vd_contract_client::{ContractError, ContractResult, Eip1193Provider};

/// Holds the connected account and asks the injected wallet for it.
///
/// `provider` is `None` when no wallet extension was found on the page; every
/// call then fails with [`ContractError::WalletUnavailable`].
pub struct WalletConnector<P> {
    provider: Option<P>,
    account: RefCell<Option<Account>>,
}

impl<P> WalletConnector<P>
where
    P: Eip1193Provider,
{
    pub fn new(provider: Option<P>) -> Self {
        Self {
            provider,
            account: RefCell::new(None),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> ContractResult<&P> {
        self.provider.as_ref().ok_or(ContractError::WalletUnavailable)
    }

    pub fn account(&self) -> Option<Account> {
        self.account.borrow().clone()
    }

    /// `eth_requestAccounts`; the first authorised address becomes current.
    pub async fn connect(&self) -> ContractResult<Account> {
        let provider = self.provider()?;
        let result = provider.request("eth_requestAccounts", json!([])).await?;
        let account = first_account(result)?
            .ok_or_else(|| ContractError::UserRejected("no account was authorised".to_owned()))?;
        info!(account = %account.short(), "wallet connected");
        *self.account.borrow_mut() = Some(account.clone());
        Ok(account)
    }

    pub fn disconnect(&self) {
        if self.account.borrow_mut().take().is_some() {
            info!("wallet disconnected");
        }
    }

    /// Apply an `accountsChanged` notification from the wallet.
    pub fn accounts_changed(&self, accounts: &[String]) -> Option<Account> {
        let next = accounts.first().map(|addr| Account(addr.clone()));
        match &next {
            Some(account) => info!(account = %account.short(), "wallet switched account"),
            None => info!("wallet revoked all accounts"),
        }
        *self.account.borrow_mut() = next.clone();
        next
    }

    /// Network id reported by the wallet (`eth_chainId`).
    pub async fn chain_id(&self) -> ContractResult<u64> {
        let result = self.provider()?.request("eth_chainId", json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ContractError::Decode(format!("eth_chainId returned {result}")))?;
        u64::from_str_radix(raw.trim_start_matches("0x"), 16)
            .map_err(|err| ContractError::Decode(format!("eth_chainId '{raw}': {err}")))
    }
}

fn first_account(result: Value) -> ContractResult<Option<Account>> {
    let accounts: Vec<String> = serde_json::from_value(result)
        .map_err(|err| ContractError::Decode(format!("eth_requestAccounts: {err}")))?;
    if accounts.len() > 1 {
        warn!(count = accounts.len(), "wallet authorised several accounts, using the first");
    }
    Ok(accounts.into_iter().next().map(Account))
}

/// Validate a user-entered address: `0x` followed by 40 hex digits. Mixed-case
/// input must carry a valid EIP-55 checksum; all-lower or all-upper input is
/// taken as is.
pub fn parse_account(input: &str) -> Result<Account> {
    let trimmed = input.trim();
    let Some(digits) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) else {
        return Err(anyhow!("address must start with 0x"));
    };
    let address = if has_mixed_case(digits) {
        Address::parse_checksummed(format!("0x{digits}"), None)
            .map_err(|err| anyhow!("'{trimmed}' is not a valid address: {err}"))?
    } else {
        digits
            .parse::<Address>()
            .map_err(|err| anyhow!("'{trimmed}' is not a valid address: {err}"))?
    };
    Ok(Account(hex::encode_prefixed(address.as_slice())))
}

fn has_mixed_case(digits: &str) -> bool {
    digits.chars().any(|c| c.is_ascii_lowercase()) && digits.chars().any(|c| c.is_ascii_uppercase())
}
