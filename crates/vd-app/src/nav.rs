use vd_contract_client::Eip1193Provider;

use crate::coordinator::Coordinator;
use crate::state::{AppState, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub page: Page,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavModel {
    pub tabs: Vec<Tab>,
    pub connected: bool,
    /// Shortened address of the connected account.
    pub account_label: Option<String>,
    pub wallet_available: bool,
    pub chain_id: Option<u64>,
}

fn label(page: Page) -> &'static str {
    match page {
        Page::Home => "Home",
        Page::Vote => "Vote",
        Page::Results => "Results",
        Page::Admin => "Admin",
    }
}

pub fn nav_model(state: &AppState, wallet_available: bool) -> NavModel {
    let mut pages = vec![Page::Home, Page::Vote, Page::Results];
    if state.is_owner {
        pages.push(Page::Admin);
    }
    NavModel {
        tabs: pages
            .into_iter()
            .map(|page| Tab {
                page,
                label: label(page),
                active: state.page == page,
            })
            .collect(),
        connected: state.is_connected(),
        account_label: state.account.as_ref().map(|account| account.short()),
        wallet_available,
        chain_id: state.chain_id,
    }
}

impl<P> Coordinator<P>
where
    P: Eip1193Provider,
{
    pub fn nav(&self) -> NavModel {
        let available = self.wallet().is_available();
        self.with_state(|s| nav_model(s, available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OWNER, VOTER, fixture};

    fn pages(model: &NavModel) -> Vec<Page> {
        model.tabs.iter().map(|tab| tab.page).collect()
    }

    #[test]
    fn disconnected_nav_has_no_admin_tab() {
        let model = nav_model(&AppState::default(), false);
        assert_eq!(pages(&model), vec![Page::Home, Page::Vote, Page::Results]);
        assert!(model.tabs[0].active);
        assert!(!model.connected);
        assert!(!model.wallet_available);
    }

    #[tokio::test]
    async fn owner_gets_admin_tab() {
        let f = fixture(OWNER);
        f.app.connect_wallet().await;
        f.app.navigate(Page::Admin);

        let model = f.app.nav();
        assert_eq!(pages(&model).last(), Some(&Page::Admin));
        assert!(model.tabs.iter().find(|t| t.page == Page::Admin).unwrap().active);
        assert_eq!(model.account_label.as_deref(), Some("0x0000...00aa"));
        assert_eq!(model.chain_id, Some(31_337));
    }

    #[tokio::test]
    async fn voter_nav_stays_public() {
        let f = fixture(VOTER);
        f.app.connect_wallet().await;
        let model = f.app.nav();
        assert!(model.connected);
        assert!(model.wallet_available);
        assert!(!pages(&model).contains(&Page::Admin));
    }
}
