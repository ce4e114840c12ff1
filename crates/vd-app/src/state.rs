use serde::{Deserialize, Serialize};
use vd_api_types::{Account, Candidate, Election, ElectionId, TokenBalance};

use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    Vote,
    Results,
    Admin,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Vote => "vote",
            Page::Results => "results",
            Page::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "home" => Some(Page::Home),
            "vote" => Some(Page::Vote),
            "results" => Some(Page::Results),
            "admin" => Some(Page::Admin),
            _ => None,
        }
    }
}

/// Cross-page state held by the coordinator.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub account: Option<Account>,
    pub chain_id: Option<u64>,
    pub is_owner: bool,
    pub elections: Vec<Election>,
    pub selected: Option<ElectionId>,
    /// Candidates from the last successful fetch.
    pub candidates: Vec<Candidate>,
    /// Election the `candidates` list was fetched for.
    pub candidates_for: Option<ElectionId>,
    pub has_voted: bool,
    pub token_balance: Option<TokenBalance>,
    pub page: Page,
    pub notice: Option<Notice>,
    /// Label of the transaction currently awaiting confirmation.
    pub pending: Option<String>,
}

impl AppState {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn selected_election(&self) -> Option<&Election> {
        let id = self.selected?;
        self.elections.iter().find(|election| election.id == id)
    }

    /// True when the candidate list belongs to the selected election.
    pub fn candidates_current(&self) -> bool {
        self.selected.is_some() && self.candidates_for == self.selected
    }

    /// Point at another election and drop everything fetched for the old one.
    pub(crate) fn select(&mut self, election: Option<ElectionId>) {
        if self.selected == election {
            return;
        }
        self.selected = election;
        self.candidates.clear();
        self.candidates_for = None;
        self.has_voted = false;
    }

    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|candidate| candidate.vote_count).sum()
    }

    /// Forget everything tied to the current account.
    pub(crate) fn clear_account(&mut self) {
        self.account = None;
        self.is_owner = false;
        self.has_voted = false;
        self.token_balance = None;
        if self.page == Page::Admin {
            self.page = Page::Home;
        }
    }
}
