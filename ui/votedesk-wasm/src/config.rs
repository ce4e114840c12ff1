//! Contract selection, persisted in `localStorage`.

use anyhow::Result;
use gloo_storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use vd_api_types::ContractVariant;
use vd_contract_client::VotingContract;
use vd_contract_evm::EvmConfig;
use vd_app::Page;

use crate::provider::BrowserProvider;

const CONFIG_KEY: &str = "votedesk_config";
const PAGE_KEY: &str = "votedesk_page";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    pub variant: ContractVariant,
    #[serde(default)]
    pub contract_address: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            variant: ContractVariant::MultiElection,
            contract_address: None,
        }
    }
}

impl UiConfig {
    pub fn load() -> Self {
        LocalStorage::get(CONFIG_KEY).unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        LocalStorage::set(CONFIG_KEY, self)?;
        Ok(())
    }

    /// Settings form values: an unknown variant keeps the current one and a
    /// blank address means "use the variant's default".
    pub fn with_form(&self, variant: &str, address: &str) -> Self {
        let address = address.trim();
        Self {
            variant: ContractVariant::parse(variant).unwrap_or(self.variant),
            contract_address: (!address.is_empty()).then(|| address.to_owned()),
        }
    }

    /// Build the gateway this configuration selects.
    pub fn gateway(&self, provider: &BrowserProvider) -> Result<Rc<dyn VotingContract>> {
        let config = EvmConfig::for_variant(self.variant, self.contract_address.as_deref())?;
        vd_contract_evm::connect(provider.clone(), self.variant, config)
    }
}

pub fn saved_page() -> Option<Page> {
    LocalStorage::get(PAGE_KEY).ok()
}

pub fn save_page(page: Page) {
    let _ = LocalStorage::set(PAGE_KEY, page);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_overrides_variant_and_address() {
        let config = UiConfig::default().with_form("single_election", "  0x00000000000000000000000000000000000000cc ");
        assert_eq!(config.variant, ContractVariant::SingleElection);
        assert_eq!(
            config.contract_address.as_deref(),
            Some("0x00000000000000000000000000000000000000cc")
        );
    }

    #[test]
    fn blank_form_falls_back_to_defaults() {
        let config = UiConfig::default().with_form("bogus", "   ");
        assert_eq!(config, UiConfig::default());
    }

    #[test]
    fn stored_config_without_address_parses() {
        let config: UiConfig = serde_json::from_str(r#"{"variant":"single_election"}"#).unwrap();
        assert_eq!(config.variant, ContractVariant::SingleElection);
        assert!(config.contract_address.is_none());
    }
}
