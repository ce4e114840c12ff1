//! VoteDesk browser front end.
//!
//! Binds the injected wallet, builds the configured contract gateway and
//! hands both to the coordinator; the modules here only paint its models and
//! forward DOM events.

pub mod config;
pub mod dom;
pub mod events;
pub mod provider;
pub mod render;
pub mod state;

use vd_app::{Coordinator, Notice};
use vd_contract_client::VotingContract;
use vd_wallet::WalletConnector;
use wasm_bindgen::prelude::*;

use crate::config::UiConfig;
use crate::provider::BrowserProvider;

#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;
    let provider = BrowserProvider::detect();

    let mut config = UiConfig::load();
    let contract = match config.gateway(&provider) {
        Ok(contract) => contract,
        Err(err) => {
            gloo_console::warn!(format!("stored contract settings rejected: {err}"));
            config = UiConfig::default();
            config.gateway(&provider).map_err(|err| JsValue::from_str(&err.to_string()))?
        }
    };
    gloo_console::log!(format!("votedesk using {} contract", contract.variant().as_str()));

    dom::clear(&els.variant_select);
    for variant in ["multi_election", "single_election"] {
        let option = dom::create_option(variant, variant, variant == config.variant.as_str())?;
        els.variant_select.append_child(&option)?;
    }
    els.contract_address
        .set_value(config.contract_address.as_deref().unwrap_or_default());

    let wallet = WalletConnector::new(provider.is_injected().then(|| provider.clone()));
    let app = state::install(Coordinator::new(wallet, contract));
    if !provider.is_injected() {
        app.set_notice(Notice::error(
            "No wallet extension detected. Install MetaMask or another Ethereum wallet to vote.",
        ));
    }

    events::bind_events(&els)?;
    events::bind_wallet_events(&els, &app)?;

    // Public reads need no account.
    app.load_global().await;
    app.reload_election().await;
    render::render(&els, &app);
    Ok(())
}
