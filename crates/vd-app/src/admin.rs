//! Admin page. Every action here requires the connected account to be the
//! contract owner.

use vd_api_types::{Account, Candidate, Election, ElectionId};
use vd_contract_client::{ContractFeatures, Eip1193Provider, parse_token_amount};
use vd_wallet::parse_account;

use crate::coordinator::Coordinator;
use crate::notice::Notice;
use crate::state::{AppState, Page};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminModel {
    /// False for everyone except the contract owner; nothing else is rendered then.
    pub visible: bool,
    pub features: ContractFeatures,
    pub elections: Vec<Election>,
    pub election: Option<Election>,
    pub candidates: Vec<Candidate>,
    pub can_remove_candidates: bool,
    pub can_start_election: bool,
    pub busy: bool,
}

pub fn admin_model(state: &AppState, features: ContractFeatures) -> AdminModel {
    if !state.is_owner {
        return AdminModel::default();
    }
    let election = state.selected_election().cloned();
    let open = election.as_ref().is_some_and(|e| e.is_open);
    let any_open = state.elections.iter().any(|e| e.is_open);

    AdminModel {
        visible: true,
        features,
        elections: state.elections.clone(),
        candidates: state.candidates.clone(),
        can_remove_candidates: features.remove_candidate && state.candidates_current() && !open,
        can_start_election: features.multiple_elections || !any_open,
        election,
        busy: state.pending.is_some(),
    }
}

fn required_text<'a>(value: &'a str, what: &str) -> Result<&'a str, Notice> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Notice::error(format!("{what} cannot be empty")))
    } else {
        Ok(trimmed)
    }
}

/// Checked with the same parser the gateways use, so anything accepted here
/// is accepted on submit.
fn positive_amount(value: &str) -> Result<String, Notice> {
    parse_token_amount(value)?;
    Ok(value.trim().to_owned())
}

impl<P> Coordinator<P>
where
    P: Eip1193Provider,
{
    pub fn admin_page(&self) -> AdminModel {
        let features = self.features();
        self.with_state(|s| admin_model(s, features))
    }

    fn require_owner(&self) -> Result<Account, Notice> {
        let account = self.require_account()?;
        if self.with_state(|s| s.is_owner) {
            Ok(account)
        } else {
            Err(Notice::error("Only the contract owner can do this"))
        }
    }

    fn require_selected(&self) -> Result<ElectionId, Notice> {
        self.with_state(|s| s.selected)
            .ok_or_else(|| Notice::error("Select an election first"))
    }

    /// Actions that depend on the candidate list need it to be the selected
    /// election's.
    fn require_current_candidates(&self) -> Result<ElectionId, Notice> {
        let election = self.require_selected()?;
        if self.with_state(|s| s.candidates_current()) {
            Ok(election)
        } else {
            Err(Notice::error("Candidates for this election could not be loaded; try again"))
        }
    }

    fn reject(&self, notice: Notice) -> bool {
        self.set_notice(notice);
        false
    }

    pub async fn create_election(&self, title: &str) -> bool {
        let checked = self.require_owner().and_then(|owner| {
            let title = required_text(title, "Election title")?;
            let any_open = self.with_state(|s| s.elections.iter().any(|e| e.is_open));
            if !self.features().multiple_elections && any_open {
                return Err(Notice::error("Close the current election before starting a new one"));
            }
            Ok((owner, title.to_owned()))
        });
        let (owner, title) = match checked {
            Ok(value) => value,
            Err(notice) => return self.reject(notice),
        };

        let contract = self.contract().clone();
        let done = format!("Election '{title}' created");
        if self
            .submit("Creating election...", &done, contract.create_election(&owner, &title))
            .await
            .is_none()
        {
            return false;
        }
        self.load_global().await;
        self.reload_election().await;
        true
    }

    pub async fn add_candidate(&self, name: &str) -> bool {
        let checked = self.require_owner().and_then(|owner| {
            let election = self.require_current_candidates()?;
            let name = required_text(name, "Candidate name")?;
            if self.with_state(|s| s.candidates.iter().any(|c| c.name == name)) {
                return Err(Notice::error(format!("Candidate '{name}' already exists")));
            }
            Ok((owner, election, name.to_owned()))
        });
        let (owner, election, name) = match checked {
            Ok(value) => value,
            Err(notice) => return self.reject(notice),
        };

        let contract = self.contract().clone();
        let done = format!("Candidate '{name}' added");
        if self
            .submit("Adding candidate...", &done, contract.add_candidate(&owner, election, &name))
            .await
            .is_none()
        {
            return false;
        }
        self.reload_election().await;
        true
    }

    pub async fn remove_candidate(&self, candidate_index: u32) -> bool {
        let checked = self.require_owner().and_then(|owner| {
            if !self.features().remove_candidate {
                return Err(Notice::error("This contract does not support removing candidates"));
            }
            let election = self.require_current_candidates()?;
            self.with_state(|s| {
                if s.selected_election().is_some_and(|e| e.is_open) {
                    return Err(Notice::error("Candidates cannot be removed while voting is open"));
                }
                s.candidates
                    .iter()
                    .find(|c| c.index == candidate_index)
                    .cloned()
                    .ok_or_else(|| Notice::error("Unknown candidate"))
            })
            .map(|candidate| (owner, election, candidate))
        });
        let (owner, election, candidate) = match checked {
            Ok(value) => value,
            Err(notice) => return self.reject(notice),
        };

        let contract = self.contract().clone();
        let done = format!("Candidate '{}' removed", candidate.name);
        if self
            .submit(
                "Removing candidate...",
                &done,
                contract.remove_candidate(&owner, election, &candidate),
            )
            .await
            .is_none()
        {
            return false;
        }
        self.reload_election().await;
        true
    }

    pub async fn set_election_status(&self, open: bool) -> bool {
        let checked = self.require_owner().and_then(|owner| {
            let election = if open {
                self.require_current_candidates()?
            } else {
                self.require_selected()?
            };
            if open && self.with_state(|s| s.candidates.is_empty()) {
                return Err(Notice::error("Add at least one candidate before opening the election"));
            }
            Ok((owner, election))
        });
        let (owner, election) = match checked {
            Ok(value) => value,
            Err(notice) => return self.reject(notice),
        };

        let contract = self.contract().clone();
        let (label, done) = if open {
            ("Opening election...", "Election opened")
        } else {
            ("Closing election...", "Election closed")
        };
        if self
            .submit(label, done, contract.set_election_status(&owner, election, open))
            .await
            .is_none()
        {
            return false;
        }
        self.load_global().await;
        self.reload_election().await;
        true
    }

    pub async fn mint_tokens(&self, to: &str, amount: &str) -> bool {
        let checked = self.require_owner().and_then(|owner| {
            if !self.features().mint_tokens {
                return Err(Notice::error("This contract does not issue tokens"));
            }
            let to = parse_account(to)?;
            let amount = positive_amount(amount)?;
            Ok((owner, to, amount))
        });
        let (owner, to, amount) = match checked {
            Ok(value) => value,
            Err(notice) => return self.reject(notice),
        };

        let contract = self.contract().clone();
        let done = format!("Minted {amount} tokens to {}", to.short());
        if self
            .submit("Minting tokens...", &done, contract.mint_tokens(&owner, &to, &amount))
            .await
            .is_none()
        {
            return false;
        }
        self.refresh_balance().await;
        true
    }

    /// Hand the contract to `new_owner`. Afterwards the current account is no
    /// longer owner and is sent back to the home page.
    pub async fn transfer_ownership(&self, new_owner: &str) -> bool {
        let checked = self.require_owner().and_then(|owner| {
            if !self.features().transfer_ownership {
                return Err(Notice::error("This contract does not support ownership transfer"));
            }
            let new_owner = parse_account(new_owner)?;
            if new_owner.matches(&owner) {
                return Err(Notice::error("That account already owns the contract"));
            }
            Ok((owner, new_owner))
        });
        let (owner, new_owner) = match checked {
            Ok(value) => value,
            Err(notice) => return self.reject(notice),
        };

        let contract = self.contract().clone();
        let done = format!("Ownership transferred to {}", new_owner.short());
        if self
            .submit(
                "Transferring ownership...",
                &done,
                contract.transfer_ownership(&owner, &new_owner),
            )
            .await
            .is_none()
        {
            return false;
        }
        self.check_owner().await;
        if !self.with_state(|s| s.is_owner) {
            self.update(|s| s.page = Page::Home);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OWNER, VOTER, fixture, fixture_with, seed_open_election};
    use vd_contract_client::VotingContract;

    #[tokio::test]
    async fn admin_model_is_hidden_from_non_owners() {
        let f = fixture(VOTER);
        f.app.connect_wallet().await;
        assert!(!f.app.admin_page().visible);
        assert!(!f.app.create_election("Board").await);
        assert!(f.contract.inner.list_elections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_runs_an_election_lifecycle() {
        let f = fixture(OWNER);
        f.app.connect_wallet().await;
        assert!(f.app.admin_page().visible);

        assert!(!f.app.create_election("   ").await);
        assert!(f.app.create_election("Board").await);
        // Only election, so it is selected after reload.
        assert_eq!(f.app.state().selected, Some(ElectionId(0)));

        assert!(!f.app.set_election_status(true).await, "no candidates yet");
        assert!(f.app.add_candidate("Ada").await);
        assert!(!f.app.add_candidate("Ada").await, "duplicate");
        assert!(f.app.add_candidate("Grace").await);
        assert!(f.app.set_election_status(true).await);

        let model = f.app.admin_page();
        assert!(model.election.as_ref().unwrap().is_open);
        assert_eq!(model.candidates.len(), 2);
        assert!(!model.can_remove_candidates);
        assert!(!f.app.remove_candidate(0).await);

        assert!(f.app.set_election_status(false).await);
        assert!(f.app.remove_candidate(0).await);
        let names: Vec<_> = f.app.state().candidates.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Grace".to_owned()]);
    }

    #[tokio::test]
    async fn single_election_contract_blocks_new_election_while_open() {
        let features = ContractFeatures {
            multiple_elections: false,
            ..ContractFeatures::all()
        };
        let f = fixture_with(OWNER, features);
        seed_open_election(&f.contract).await;
        f.app.connect_wallet().await;

        assert!(!f.app.admin_page().can_start_election);
        assert!(!f.app.create_election("Next").await);
        assert!(f.app.state().notice.unwrap().text.contains("Close the current election"));
    }

    #[tokio::test]
    async fn mint_validates_inputs() {
        let f = fixture(OWNER);
        f.app.connect_wallet().await;

        assert!(!f.app.mint_tokens("not-an-address", "5").await);
        assert!(!f.app.mint_tokens(VOTER, "-2").await);
        assert!(!f.app.mint_tokens(VOTER, "1e3").await);
        assert!(f.app.state().notice.unwrap().text.contains("not a positive token amount"));
        assert!(f.app.mint_tokens(VOTER, "5").await);
        let balance = f
            .contract
            .inner
            .token_balance(&Account(VOTER.to_owned()))
            .await
            .unwrap();
        assert_eq!(balance.amount, "5");
    }

    #[tokio::test]
    async fn transfer_ownership_leaves_admin() {
        let f = fixture(OWNER);
        f.app.connect_wallet().await;
        f.app.navigate(Page::Admin);

        assert!(!f.app.transfer_ownership(OWNER).await);
        assert!(f.app.transfer_ownership(VOTER).await);
        let state = f.app.state();
        assert!(!state.is_owner);
        assert_eq!(state.page, Page::Home);
        assert!(!f.app.admin_page().visible);
    }

    #[tokio::test]
    async fn reverted_transaction_becomes_a_notice() {
        let f = fixture(OWNER);
        f.app.connect_wallet().await;
        f.app.create_election("Board").await;
        // Owner changed behind the app's back: the contract rejects the call.
        f.contract
            .inner
            .transfer_ownership(&crate::testing::owner(), &Account(VOTER.to_owned()))
            .await
            .unwrap();

        assert!(!f.app.add_candidate("Ada").await);
        let state = f.app.state();
        assert!(state.pending.is_none());
        assert!(state.notice.unwrap().text.contains("caller is not the owner"));
    }
}
