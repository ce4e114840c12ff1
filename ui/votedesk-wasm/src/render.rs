//! Paint the coordinator's view models into the DOM.

use vd_api_types::{Election, ElectionId};
use vd_app::admin::AdminModel;
use vd_app::results::ResultsModel;
use vd_app::vote::VoteModel;
use wasm_bindgen::prelude::*;
use web_sys::HtmlSelectElement;

use crate::dom::{self, Elements};
use crate::state::App;

pub fn render(els: &Elements, app: &App) {
    if let Err(err) = paint(els, app) {
        gloo_console::error!(format!("render failed: {err:?}"));
    }
}

fn paint(els: &Elements, app: &App) -> Result<(), JsValue> {
    let state = app.state();
    render_header(els, app)?;

    match &state.notice {
        Some(notice) => {
            dom::set_hidden(&els.notice, false);
            els.notice.set_class_name(&format!("notice {}", notice.level.css_class()));
            dom::set_text(&els.notice_text, &notice.text);
        }
        None => dom::set_hidden(&els.notice, true),
    }

    for page in &els.pages {
        let id = page.id();
        dom::toggle_class(page, "active", id == format!("page-{}", state.page.as_str()));
    }

    render_home(els, &state.elections, state.selected)?;
    render_vote(els, &app.vote_page())?;
    render_results(els, &app.results())?;
    render_admin(els, &app.admin_page())?;
    Ok(())
}

fn render_header(els: &Elements, app: &App) -> Result<(), JsValue> {
    let nav = app.nav();
    dom::clear(&els.nav_tabs);
    for tab in &nav.tabs {
        let class = if tab.active { "tab active" } else { "tab" };
        let btn = dom::button(class, tab.label, ("data-page", tab.page.as_str()))?;
        els.nav_tabs.append_child(&btn)?;
    }

    dom::set_hidden(&els.connect_btn, nav.connected);
    dom::set_hidden(&els.disconnect_btn, !nav.connected);
    let label = match (&nav.account_label, nav.wallet_available) {
        (Some(account), _) => account.clone(),
        (None, true) => "Not connected".to_owned(),
        (None, false) => "No wallet detected".to_owned(),
    };
    dom::set_text(&els.account_label, &label);
    let chain = nav.chain_id.map(|id| format!("chain {id}")).unwrap_or_default();
    dom::set_text(&els.chain_label, &chain);
    Ok(())
}

fn fill_election_select(
    select: &HtmlSelectElement,
    elections: &[Election],
    selected: Option<ElectionId>,
) -> Result<(), JsValue> {
    dom::clear(select);
    select.append_child(&dom::create_option("", "Choose an election", selected.is_none())?.into())?;
    for election in elections {
        let status = if election.is_open { "open" } else { "closed" };
        let text = format!("{} ({status})", election.title);
        let option = dom::create_option(&election.id.to_string(), &text, selected == Some(election.id))?;
        select.append_child(&option)?;
    }
    Ok(())
}

fn render_home(els: &Elements, elections: &[Election], selected: Option<ElectionId>) -> Result<(), JsValue> {
    let list = &els.home_elections;
    dom::clear(list);
    if elections.is_empty() {
        list.append_child(&dom::text_element("div", "empty", "No elections yet.")?.into())?;
        return Ok(());
    }
    for election in elections {
        let class = if selected == Some(election.id) {
            "election-card election-card--active"
        } else {
            "election-card"
        };
        let card = dom::create_element("div")?;
        card.set_class_name(class);
        card.append_child(&dom::text_element("div", "ec-title", &election.title)?.into())?;
        let status = if election.is_open { "Voting open" } else { "Voting closed" };
        card.append_child(&dom::text_element("div", "ec-status", status)?.into())?;
        card.append_child(&dom::button("secondary", "Open", ("data-election", &election.id.to_string()))?.into())?;
        list.append_child(&card)?;
    }
    Ok(())
}

fn render_vote(els: &Elements, model: &VoteModel) -> Result<(), JsValue> {
    fill_election_select(
        &els.vote_election_select,
        &model.elections,
        model.election.as_ref().map(|e| e.id),
    )?;

    let status = match (model.blocked_reason, &model.election) {
        (Some(reason), _) => reason.to_owned(),
        (None, Some(election)) => format!("Choose a candidate in '{}'", election.title),
        (None, None) => String::new(),
    };
    dom::set_text(&els.vote_status, &status);

    dom::clear(&els.vote_list);
    for row in &model.rows {
        let item = dom::create_element("li")?;
        item.set_class_name("candidate");
        item.append_child(&dom::text_element("span", "cand-name", &row.candidate.name)?.into())?;
        let tally = format!("{} votes ({})", row.candidate.vote_count, row.percent);
        item.append_child(&dom::text_element("span", "cand-votes", &tally)?.into())?;
        if model.can_vote {
            let index = row.candidate.index.to_string();
            item.append_child(&dom::button("primary", "Vote", ("data-candidate", &index))?.into())?;
        }
        els.vote_list.append_child(&item)?;
    }

    let balance = model
        .balance
        .as_ref()
        .map(|amount| format!("Token balance: {amount}"))
        .unwrap_or_default();
    dom::set_text(&els.vote_balance, &balance);
    Ok(())
}

fn render_results(els: &Elements, model: &ResultsModel) -> Result<(), JsValue> {
    let title = match &model.election_title {
        Some(title) if model.is_open => format!("{title} (voting open)"),
        Some(title) => format!("{title} (final)"),
        None => "Select an election to see results".to_owned(),
    };
    dom::set_text(&els.results_title, &title);

    dom::clear(&els.results_body);
    for row in &model.rows {
        let tr = dom::create_element("tr")?;
        if row.is_leader {
            tr.set_class_name("leader");
        }
        tr.append_child(&dom::text_element("td", "", &row.name)?.into())?;
        tr.append_child(&dom::text_element("td", "num", &row.votes.to_string())?.into())?;
        tr.append_child(&dom::text_element("td", "num", &row.percent.to_string())?.into())?;
        els.results_body.append_child(&tr)?;
    }

    dom::set_text(&els.results_total, &format!("Total votes: {}", model.total_votes));
    let leaders = model.leaders();
    let leader = match leaders.len() {
        0 => String::new(),
        1 => format!("Leading: {}", leaders[0]),
        _ => format!("Tied: {}", leaders.join(", ")),
    };
    dom::set_text(&els.results_leader, &leader);
    Ok(())
}

fn render_admin(els: &Elements, model: &AdminModel) -> Result<(), JsValue> {
    dom::set_hidden(&els.admin_panel, !model.visible);
    if !model.visible {
        return Ok(());
    }

    fill_election_select(
        &els.admin_election_select,
        &model.elections,
        model.election.as_ref().map(|e| e.id),
    )?;
    dom::set_disabled(&els.create_election_btn, model.busy || !model.can_start_election);

    dom::clear(&els.admin_candidates);
    for candidate in &model.candidates {
        let item = dom::create_element("li")?;
        let text = format!("{} ({} votes)", candidate.name, candidate.vote_count);
        item.append_child(&dom::text_element("span", "cand-name", &text)?.into())?;
        if model.can_remove_candidates {
            let index = candidate.index.to_string();
            item.append_child(&dom::button("danger", "Remove", ("data-remove", &index))?.into())?;
        }
        els.admin_candidates.append_child(&item)?;
    }

    let open = model.election.as_ref().map(|e| e.is_open);
    dom::set_disabled(&els.open_election_btn, model.busy || open != Some(false));
    dom::set_disabled(&els.close_election_btn, model.busy || open != Some(true));
    dom::set_disabled(&els.add_candidate_btn, model.busy || model.election.is_none());

    dom::set_hidden(&els.token_section, !model.features.mint_tokens);
    dom::set_hidden(&els.ownership_section, !model.features.transfer_ownership);
    Ok(())
}
