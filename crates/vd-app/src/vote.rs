//! Vote page.

use vd_api_types::{Candidate, Election};
use vd_contract_client::Eip1193Provider;

use crate::coordinator::Coordinator;
use crate::notice::Notice;
use crate::results::{Percent, percentages};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub candidate: Candidate,
    pub percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoteModel {
    pub elections: Vec<Election>,
    pub election: Option<Election>,
    pub rows: Vec<VoteRow>,
    pub total_votes: u64,
    pub has_voted: bool,
    /// Vote buttons are rendered only when this is true.
    pub can_vote: bool,
    pub blocked_reason: Option<&'static str>,
    pub balance: Option<String>,
}

fn blocked_reason(state: &AppState) -> Option<&'static str> {
    if !state.is_connected() {
        return Some("Connect your wallet to vote");
    }
    let Some(election) = state.selected_election() else {
        return Some("Select an election");
    };
    if state.has_voted {
        return Some("You have already voted in this election");
    }
    if !election.is_open {
        return Some("This election is closed");
    }
    if !state.candidates_current() {
        return Some("Candidates for this election could not be loaded");
    }
    if state.candidates.is_empty() {
        return Some("No candidates have been registered yet");
    }
    if state.pending.is_some() {
        return Some("A transaction is awaiting confirmation");
    }
    None
}

pub fn vote_model(state: &AppState) -> VoteModel {
    let votes: Vec<u64> = state.candidates.iter().map(|c| c.vote_count).collect();
    let rows = state
        .candidates
        .iter()
        .cloned()
        .zip(percentages(&votes))
        .map(|(candidate, percent)| VoteRow { candidate, percent })
        .collect();
    let blocked = blocked_reason(state);

    VoteModel {
        elections: state.elections.clone(),
        election: state.selected_election().cloned(),
        rows,
        total_votes: state.total_votes(),
        has_voted: state.has_voted,
        can_vote: blocked.is_none(),
        blocked_reason: blocked,
        balance: state.token_balance.as_ref().map(|b| b.amount.clone()),
    }
}

impl<P> Coordinator<P>
where
    P: Eip1193Provider,
{
    pub fn vote_page(&self) -> VoteModel {
        self.with_state(vote_model)
    }

    /// Cast a vote for the candidate at `candidate_index` in the selected
    /// election, then reload the tallies.
    pub async fn cast_vote(&self, candidate_index: u32) -> bool {
        let (account, election, candidate) = match self.with_state(|s| {
            if let Some(reason) = blocked_reason(s) {
                return Err(Notice::error(reason));
            }
            let candidate = s
                .candidates
                .iter()
                .find(|c| c.index == candidate_index)
                .cloned()
                .ok_or_else(|| Notice::error("Unknown candidate"))?;
            match (s.account.clone(), s.selected) {
                (Some(account), Some(election)) => Ok((account, election, candidate)),
                _ => Err(Notice::error("Select an election")),
            }
        }) {
            Ok(target) => target,
            Err(notice) => {
                self.set_notice(notice);
                return false;
            }
        };

        let contract = self.contract().clone();
        let done = format!("Vote for {} recorded", candidate.name);
        let receipt = self
            .submit(
                "Submitting vote...",
                &done,
                contract.cast_vote(&account, election, &candidate),
            )
            .await;
        if receipt.is_none() {
            return false;
        }

        self.update(|s| {
            if s.selected == Some(election) {
                s.has_voted = true;
            }
        });
        self.reload_election().await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OWNER, VOTER, fixture, fixture_with, seed_open_election};
    use vd_api_types::ElectionId;
    use vd_contract_client::{ContractFeatures, VotingContract};

    #[tokio::test]
    async fn disconnected_user_is_asked_to_connect() {
        let f = fixture(VOTER);
        let model = f.app.vote_page();
        assert!(!model.can_vote);
        assert_eq!(model.blocked_reason, Some("Connect your wallet to vote"));
        assert!(!f.app.cast_vote(0).await);
    }

    #[tokio::test]
    async fn vote_sets_flag_and_removes_action() {
        let f = fixture(VOTER);
        seed_open_election(&f.contract).await;
        f.app.connect_wallet().await;
        assert!(f.app.vote_page().can_vote);

        assert!(f.app.cast_vote(1).await);
        let model = f.app.vote_page();
        assert!(model.has_voted);
        assert!(!model.can_vote);
        assert_eq!(model.rows[1].candidate.vote_count, 1);
        assert_eq!(model.rows[1].percent, Percent(1000));
        assert_eq!(model.total_votes, 1);

        // A second attempt never reaches the contract.
        assert!(!f.app.cast_vote(0).await);
        assert_eq!(f.contract.inner.candidates(ElectionId(0)).await.unwrap()[0].vote_count, 0);
    }

    #[tokio::test]
    async fn flag_survives_reload_without_vote_query() {
        let features = ContractFeatures {
            has_voted_query: false,
            ..ContractFeatures::all()
        };
        let f = fixture_with(VOTER, features);
        seed_open_election(&f.contract).await;
        f.app.connect_wallet().await;

        assert!(f.app.cast_vote(0).await);
        f.app.reload_election().await;
        assert!(f.app.vote_page().has_voted);
        assert!(!f.app.vote_page().can_vote);
    }

    #[tokio::test]
    async fn closed_election_offers_no_vote() {
        let f = fixture(VOTER);
        let id = seed_open_election(&f.contract).await;
        f.contract
            .inner
            .set_election_status(&crate::testing::owner(), id, false)
            .await
            .unwrap();
        f.app.connect_wallet().await;

        let model = f.app.vote_page();
        assert_eq!(model.blocked_reason, Some("This election is closed"));
    }

    #[tokio::test]
    async fn already_voted_account_sees_no_vote_action_after_connect() {
        let f = fixture(VOTER);
        let id = seed_open_election(&f.contract).await;
        let ada = f.contract.inner.candidates(id).await.unwrap()[0].clone();
        f.contract
            .inner
            .cast_vote(&vd_api_types::Account(VOTER.to_owned()), id, &ada)
            .await
            .unwrap();

        f.app.connect_wallet().await;
        let model = f.app.vote_page();
        assert!(model.has_voted);
        assert!(!model.can_vote);
    }

    #[tokio::test]
    async fn vote_is_refused_when_switched_election_failed_to_load() {
        let f = fixture(VOTER);
        let first = seed_open_election(&f.contract).await;
        let second = seed_open_election(&f.contract).await;
        f.app.connect_wallet().await;
        f.app.select_election(first).await;
        assert!(f.app.vote_page().can_vote);

        f.contract.reads_fail.set(true);
        f.app.select_election(second).await;
        let model = f.app.vote_page();
        assert!(model.rows.is_empty());
        assert!(!model.can_vote);
        assert_eq!(model.blocked_reason, Some("Candidates for this election could not be loaded"));

        assert!(!f.app.cast_vote(0).await);
        f.contract.reads_fail.set(false);
        for id in [first, second] {
            let tallies = f.contract.inner.candidates(id).await.unwrap();
            assert!(tallies.iter().all(|c| c.vote_count == 0));
        }
    }

    #[tokio::test]
    async fn owner_sees_balance_when_supported() {
        let f = fixture(OWNER);
        seed_open_election(&f.contract).await;
        f.app.connect_wallet().await;
        assert_eq!(f.app.vote_page().balance.as_deref(), Some("0"));
    }
}
