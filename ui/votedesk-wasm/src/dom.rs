//! DOM element bindings, resolved once at startup.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

pub fn by_id(id: &str) -> Option<Element> {
    gloo_utils::document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    gloo_utils::document().create_element(tag)
}

/// Element with a class and text content; text is never parsed as HTML.
pub fn text_element(tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
    let el = create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    el.set_text_content(Some(text));
    Ok(el)
}

pub fn button(class: &str, text: &str, data: (&str, &str)) -> Result<Element, JsValue> {
    let btn = text_element("button", class, text)?;
    btn.set_attribute(data.0, data.1)?;
    Ok(btn)
}

pub fn create_option(value: &str, text: &str, selected: bool) -> Result<HtmlOptionElement, JsValue> {
    let opt: HtmlOptionElement = create_element("option")?.dyn_into()?;
    opt.set_value(value);
    opt.set_text_content(Some(text));
    opt.set_selected(selected);
    Ok(opt)
}

pub fn clear(el: &Element) {
    el.set_text_content(None);
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_owned()
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_hidden(el: &Element, hidden: bool) {
    toggle_class(el, "hidden", hidden);
}

pub fn set_disabled(el: &HtmlElement, disabled: bool) {
    if disabled {
        let _ = el.set_attribute("disabled", "");
    } else {
        let _ = el.remove_attribute("disabled");
    }
}

/// Read `attr` from the closest ancestor of the event target carrying it.
pub fn data_from_event(event: &web_sys::Event, attr: &str) -> Option<String> {
    let target: Element = event.target()?.dyn_into().ok()?;
    let holder = target.closest(&format!("[{attr}]")).ok()??;
    holder.get_attribute(attr)
}

pub fn confirm(message: &str) -> bool {
    gloo_utils::window().confirm_with_message(message).unwrap_or(false)
}

#[derive(Clone)]
pub struct Elements {
    // Header
    pub nav_tabs: Element,
    pub connect_btn: HtmlElement,
    pub disconnect_btn: HtmlElement,
    pub account_label: Element,
    pub chain_label: Element,
    pub notice: Element,
    pub notice_text: Element,
    pub notice_dismiss: HtmlElement,

    pub pages: Vec<Element>,

    // Home
    pub home_elections: Element,
    pub variant_select: HtmlSelectElement,
    pub contract_address: HtmlInputElement,
    pub save_settings_btn: HtmlElement,

    // Vote
    pub vote_election_select: HtmlSelectElement,
    pub vote_status: Element,
    pub vote_list: Element,
    pub vote_balance: Element,

    // Results
    pub results_title: Element,
    pub results_body: Element,
    pub results_total: Element,
    pub results_leader: Element,
    pub refresh_results_btn: HtmlElement,

    // Admin
    pub admin_panel: Element,
    pub new_election_title: HtmlInputElement,
    pub create_election_btn: HtmlElement,
    pub admin_election_select: HtmlSelectElement,
    pub candidate_name: HtmlInputElement,
    pub add_candidate_btn: HtmlElement,
    pub admin_candidates: Element,
    pub open_election_btn: HtmlElement,
    pub close_election_btn: HtmlElement,
    pub token_section: Element,
    pub mint_to: HtmlInputElement,
    pub mint_amount: HtmlInputElement,
    pub mint_btn: HtmlElement,
    pub ownership_section: Element,
    pub new_owner: HtmlInputElement,
    pub transfer_btn: HtmlElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id)))?
    };
}

impl Elements {
    pub fn bind() -> Result<Elements, JsValue> {
        let pages = ["home", "vote", "results", "admin"]
            .iter()
            .map(|page| {
                let id = format!("page-{page}");
                by_id(&id).ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Elements {
            nav_tabs: get_el!("navTabs"),
            connect_btn: get_typed!(HtmlElement, "connectBtn"),
            disconnect_btn: get_typed!(HtmlElement, "disconnectBtn"),
            account_label: get_el!("accountLabel"),
            chain_label: get_el!("chainLabel"),
            notice: get_el!("notice"),
            notice_text: get_el!("noticeText"),
            notice_dismiss: get_typed!(HtmlElement, "noticeDismiss"),

            pages,

            home_elections: get_el!("homeElections"),
            variant_select: get_typed!(HtmlSelectElement, "variantSelect"),
            contract_address: get_typed!(HtmlInputElement, "contractAddress"),
            save_settings_btn: get_typed!(HtmlElement, "saveSettingsBtn"),

            vote_election_select: get_typed!(HtmlSelectElement, "voteElectionSelect"),
            vote_status: get_el!("voteStatus"),
            vote_list: get_el!("voteList"),
            vote_balance: get_el!("voteBalance"),

            results_title: get_el!("resultsTitle"),
            results_body: get_el!("resultsBody"),
            results_total: get_el!("resultsTotal"),
            results_leader: get_el!("resultsLeader"),
            refresh_results_btn: get_typed!(HtmlElement, "refreshResultsBtn"),

            admin_panel: get_el!("adminPanel"),
            new_election_title: get_typed!(HtmlInputElement, "newElectionTitle"),
            create_election_btn: get_typed!(HtmlElement, "createElectionBtn"),
            admin_election_select: get_typed!(HtmlSelectElement, "adminElectionSelect"),
            candidate_name: get_typed!(HtmlInputElement, "candidateName"),
            add_candidate_btn: get_typed!(HtmlElement, "addCandidateBtn"),
            admin_candidates: get_el!("adminCandidates"),
            open_election_btn: get_typed!(HtmlElement, "openElectionBtn"),
            close_election_btn: get_typed!(HtmlElement, "closeElectionBtn"),
            token_section: get_el!("tokenSection"),
            mint_to: get_typed!(HtmlInputElement, "mintTo"),
            mint_amount: get_typed!(HtmlInputElement, "mintAmount"),
            mint_btn: get_typed!(HtmlElement, "mintBtn"),
            ownership_section: get_el!("ownershipSection"),
            new_owner: get_typed!(HtmlInputElement, "newOwner"),
            transfer_btn: get_typed!(HtmlElement, "transferBtn"),
        })
    }
}
