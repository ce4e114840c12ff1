use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContractVariant {
    MultiElection,
    SingleElection,
    InMemory,
}

impl ContractVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractVariant::MultiElection => "multi_election",
            ContractVariant::SingleElection => "single_election",
            ContractVariant::InMemory => "in_memory",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "multi_election" => Some(ContractVariant::MultiElection),
            "single_election" => Some(ContractVariant::SingleElection),
            "in_memory" => Some(ContractVariant::InMemory),
            _ => None,
        }
    }
}

/// Wallet address as reported by the provider.
///
/// Providers disagree on casing, so equality goes through [`Account::matches`]
/// whenever an address from the wallet is compared with one read from the contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account(pub String);

impl Account {
    pub fn matches(&self, other: &Account) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// `0x1234...abcd`
    pub fn short(&self) -> String {
        let addr = self.0.as_str();
        if addr.len() <= 10 {
            return addr.to_owned();
        }
        format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElectionId(pub u64);

impl fmt::Display for ElectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    pub is_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub index: u32,
    pub name: String,
    pub vote_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxHash(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenBalance {
    pub account: Account,
    /// Whole-token units, already formatted for display.
    pub amount: String,
}
