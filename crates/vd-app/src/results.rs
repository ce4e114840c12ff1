//! Results page: tallies and percentages.

use std::fmt;
use vd_contract_client::Eip1193Provider;

use crate::coordinator::Coordinator;
use crate::state::AppState;

/// Share of the vote in tenths of a percent (`425` is 42.5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percent(pub u16);

impl Percent {
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}%", self.0 / 10, self.0 % 10)
    }
}

/// Largest-remainder rounding to one decimal: the shares add up to exactly
/// 100.0% whenever any vote was cast, and are all 0% otherwise.
pub fn percentages(votes: &[u64]) -> Vec<Percent> {
    let total: u128 = votes.iter().map(|&v| u128::from(v)).sum();
    if total == 0 {
        return vec![Percent(0); votes.len()];
    }

    let mut shares: Vec<u128> = Vec::with_capacity(votes.len());
    let mut remainders: Vec<(u128, usize)> = Vec::with_capacity(votes.len());
    for (index, &count) in votes.iter().enumerate() {
        let scaled = u128::from(count) * 1000;
        shares.push(scaled / total);
        remainders.push((scaled % total, index));
    }

    let assigned: u128 = shares.iter().sum();
    let mut missing = 1000 - assigned;
    // Biggest remainder first; earlier candidates win ties.
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, index) in remainders {
        if missing == 0 {
            break;
        }
        shares[index] += 1;
        missing -= 1;
    }

    shares.into_iter().map(|share| Percent(share as u16)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub votes: u64,
    pub percent: Percent,
    pub is_leader: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsModel {
    pub election_title: Option<String>,
    pub is_open: bool,
    /// Most votes first.
    pub rows: Vec<ResultRow>,
    pub total_votes: u64,
}

impl ResultsModel {
    pub fn leaders(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| row.is_leader)
            .map(|row| row.name.as_str())
            .collect()
    }
}

pub fn results_model(state: &AppState) -> ResultsModel {
    let election = state.selected_election();
    let votes: Vec<u64> = state.candidates.iter().map(|c| c.vote_count).collect();
    let shares = percentages(&votes);
    let total_votes = state.total_votes();
    let top = votes.iter().copied().max().unwrap_or(0);

    let mut rows: Vec<ResultRow> = state
        .candidates
        .iter()
        .zip(shares)
        .map(|(candidate, percent)| ResultRow {
            name: candidate.name.clone(),
            votes: candidate.vote_count,
            percent,
            is_leader: total_votes > 0 && candidate.vote_count == top,
        })
        .collect();
    rows.sort_by(|a, b| b.votes.cmp(&a.votes));

    ResultsModel {
        election_title: election.map(|e| e.title.clone()),
        is_open: election.is_some_and(|e| e.is_open),
        rows,
        total_votes,
    }
}

impl<P> Coordinator<P>
where
    P: Eip1193Provider,
{
    pub fn results(&self) -> ResultsModel {
        self.with_state(results_model)
    }

    /// Re-read tallies for the selected election.
    pub async fn refresh_results(&self) {
        self.reload_election().await;
    }
}
