//! Event wiring. Every handler runs against the coordinator singleton and
//! repaints once the action settles.

use gloo_timers::future::TimeoutFuture;
use vd_api_types::ElectionId;
use vd_app::Page;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlSelectElement};

use crate::config::{self, UiConfig};
use crate::dom::{self, Elements};
use crate::render;
use crate::state::{self, App};

/// Attach an async handler for `$event` on `$target`. The page is repainted
/// once right after the handler starts, so pending labels show up, and again
/// when it finishes.
macro_rules! on_async {
    ($target:expr, $event:literal, $els:expr, $handler:path) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |event: Event| {
            let Some(app) = state::app() else {
                return;
            };
            let (els2, app2) = (els.clone(), app.clone());
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2, &app2, &event).await;
                render::render(&els2, &app2);
            });
            let els3 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                TimeoutFuture::new(0).await;
                render::render(&els3, &app);
            });
        }) as Box<dyn FnMut(Event)>);
        $target.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    // Header
    on_async!(els.connect_btn, "click", els, on_connect);
    on_async!(els.disconnect_btn, "click", els, on_disconnect);
    on_async!(els.notice_dismiss, "click", els, on_dismiss);
    on_async!(els.nav_tabs, "click", els, on_tab);

    // Home
    on_async!(els.home_elections, "click", els, on_open_election);
    on_async!(els.save_settings_btn, "click", els, on_save_settings);

    // Vote / results
    on_async!(els.vote_election_select, "change", els, on_election_select);
    on_async!(els.vote_list, "click", els, on_vote);
    on_async!(els.refresh_results_btn, "click", els, on_refresh_results);

    // Admin
    on_async!(els.create_election_btn, "click", els, on_create_election);
    on_async!(els.admin_election_select, "change", els, on_election_select);
    on_async!(els.add_candidate_btn, "click", els, on_add_candidate);
    on_async!(els.admin_candidates, "click", els, on_remove_candidate);
    on_async!(els.open_election_btn, "click", els, on_open_voting);
    on_async!(els.close_election_btn, "click", els, on_close_voting);
    on_async!(els.mint_btn, "click", els, on_mint);
    on_async!(els.transfer_btn, "click", els, on_transfer);
    Ok(())
}

/// Forward wallet account switches to the coordinator.
pub fn bind_wallet_events(els: &Elements, app: &App) -> Result<(), JsValue> {
    let els = els.clone();
    app.wallet().provider().map_or(Ok(()), |provider| {
        provider.on_accounts_changed(move |accounts| {
            let Some(app) = state::app() else {
                return;
            };
            let els = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                gloo_console::log!(format!("wallet accounts changed: {}", accounts.len()));
                app.accounts_changed(&accounts).await;
                render::render(&els, &app);
            });
        })
    })
}

fn selected_election(select: &HtmlSelectElement) -> Option<ElectionId> {
    select.value().parse().ok().map(ElectionId)
}

async fn on_connect(_els: &Elements, app: &App, _event: &Event) {
    if app.connect_wallet().await {
        if let Some(page) = config::saved_page() {
            app.open_page(page).await;
        }
    }
}

async fn on_disconnect(_els: &Elements, app: &App, _event: &Event) {
    app.disconnect();
}

async fn on_dismiss(_els: &Elements, app: &App, _event: &Event) {
    app.dismiss_notice();
}

async fn on_tab(_els: &Elements, app: &App, event: &Event) {
    let Some(page) = dom::data_from_event(event, "data-page").and_then(|p| Page::parse(&p)) else {
        return;
    };
    app.open_page(page).await;
    config::save_page(app.with_state(|s| s.page));
}

async fn on_open_election(_els: &Elements, app: &App, event: &Event) {
    let Some(id) = dom::data_from_event(event, "data-election").and_then(|id| id.parse().ok()) else {
        return;
    };
    app.navigate(Page::Vote);
    app.select_election(ElectionId(id)).await;
}

async fn on_election_select(_els: &Elements, app: &App, event: &Event) {
    let select = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlSelectElement>().ok());
    if let Some(election) = select.as_ref().and_then(selected_election) {
        app.select_election(election).await;
    }
}

async fn on_save_settings(els: &Elements, app: &App, _event: &Event) {
    let config = UiConfig::load().with_form(&els.variant_select.value(), &dom::input_value(&els.contract_address));
    // Validate before persisting so a bad address never sticks.
    let saved = config
        .gateway(&crate::provider::BrowserProvider::detect())
        .and_then(|_| config.save());
    match saved {
        Ok(()) => {
            let _ = gloo_utils::window().location().reload();
        }
        Err(err) => app.set_notice(err.into()),
    }
}

async fn on_vote(_els: &Elements, app: &App, event: &Event) {
    if let Some(index) = dom::data_from_event(event, "data-candidate").and_then(|i| i.parse().ok()) {
        app.cast_vote(index).await;
    }
}

async fn on_refresh_results(_els: &Elements, app: &App, _event: &Event) {
    app.refresh_results().await;
}

async fn on_create_election(els: &Elements, app: &App, _event: &Event) {
    if app.create_election(&dom::input_value(&els.new_election_title)).await {
        els.new_election_title.set_value("");
    }
}

async fn on_add_candidate(els: &Elements, app: &App, _event: &Event) {
    if app.add_candidate(&dom::input_value(&els.candidate_name)).await {
        els.candidate_name.set_value("");
    }
}

async fn on_remove_candidate(_els: &Elements, app: &App, event: &Event) {
    let Some(index) = dom::data_from_event(event, "data-remove").and_then(|i| i.parse::<u32>().ok()) else {
        return;
    };
    let name = app.with_state(|s| {
        s.candidates
            .iter()
            .find(|c| c.index == index)
            .map(|c| c.name.clone())
    });
    if let Some(name) = name {
        if dom::confirm(&format!("Remove candidate '{name}'?")) {
            app.remove_candidate(index).await;
        }
    }
}

async fn on_open_voting(_els: &Elements, app: &App, _event: &Event) {
    app.set_election_status(true).await;
}

async fn on_close_voting(_els: &Elements, app: &App, _event: &Event) {
    app.set_election_status(false).await;
}

async fn on_mint(els: &Elements, app: &App, _event: &Event) {
    let to = dom::input_value(&els.mint_to);
    if app.mint_tokens(&to, &dom::input_value(&els.mint_amount)).await {
        els.mint_amount.set_value("");
    }
}

async fn on_transfer(els: &Elements, app: &App, _event: &Event) {
    let new_owner = dom::input_value(&els.new_owner);
    let prompt = format!("Transfer contract ownership to {new_owner}? You will lose admin access.");
    if !new_owner.is_empty() && !dom::confirm(&prompt) {
        return;
    }
    if app.transfer_ownership(&new_owner).await {
        els.new_owner.set_value("");
    }
}
