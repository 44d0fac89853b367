//! Session state and vote application.
//!
//! [`Session`] owns the catalog with its live ratings, the pair-exclusion
//! set for unconstrained mode, the vote counter, and the optional budget.
//! It is the only place ratings change. Options hand out copies of
//! proposals for display; votes are resolved back to the canonical catalog
//! by ID before any rating moves, so stale copies inside an option can
//! never corrupt state.

use std::collections::HashSet;

use rand::Rng;
use thiserror::Error;

use crate::budget::synthesize_matchup;
use crate::constants::INITIAL_RATING;
use crate::elo::update_ratings;
use crate::pairing::next_unseen_pair;
use crate::types::{MatchupOption, Proposal, Snapshot, pair_key};

/// A vote that could not be applied. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// An option referenced a proposal ID missing from the catalog.
    #[error("option references unknown proposal \"{0}\"")]
    UnknownProposal(String),
    /// A combination option carried no members.
    #[error("combination option has no members")]
    EmptyCombination,
}

/// One ranking session over a proposal catalog.
pub struct Session {
    proposals: Vec<Proposal>,
    default_catalog: Vec<Proposal>,
    used_pairs: HashSet<String>,
    vote_count: u64,
    budget: Option<f64>,
}

impl Session {
    /// Start a fresh session. Non-finite or non-positive catalog ratings
    /// are normalized to the initial 1500 on intake.
    pub fn new(catalog: Vec<Proposal>) -> Self {
        let catalog = normalize_ratings(catalog);
        Session {
            proposals: catalog.clone(),
            default_catalog: catalog,
            used_pairs: HashSet::new(),
            vote_count: 0,
            budget: None,
        }
    }

    /// Resume from a persisted snapshot. `catalog` is kept aside as the
    /// [`reset`](Session::reset) target; the snapshot's proposals and
    /// ratings are restored as-is.
    pub fn from_snapshot(catalog: Vec<Proposal>, snapshot: Snapshot) -> Self {
        Session {
            proposals: snapshot.programmes,
            default_catalog: normalize_ratings(catalog),
            used_pairs: snapshot.used_pairs.into_iter().collect(),
            vote_count: snapshot.vote_count,
            budget: snapshot.current_budget,
        }
    }

    /// Serializable copy of the current state. Exclusion keys are sorted
    /// so equal states produce identical snapshots.
    pub fn snapshot(&self) -> Snapshot {
        let mut used_pairs: Vec<String> = self.used_pairs.iter().cloned().collect();
        used_pairs.sort_unstable();
        Snapshot {
            programmes: self.proposals.clone(),
            vote_count: self.vote_count,
            used_pairs,
            current_budget: self.budget,
        }
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn vote_count(&self) -> u64 {
        self.vote_count
    }

    pub fn budget(&self) -> Option<f64> {
        self.budget
    }

    /// Switch between budget mode (`Some`) and unconstrained mode (`None`).
    ///
    /// The pair-exclusion set is not cleared: it only constrains
    /// unconstrained mode, and an unconstrained session interrupted by
    /// budget votes resumes where it left off.
    pub fn set_budget(&mut self, budget: Option<f64>) {
        self.budget = budget;
    }

    /// Restore the default catalog and clear all progress: ratings back to
    /// their catalog values, vote count zeroed, exclusions emptied, budget
    /// cleared.
    pub fn reset(&mut self) {
        self.proposals = self.default_catalog.clone();
        self.used_pairs.clear();
        self.vote_count = 0;
        self.budget = None;
    }

    /// Next unconstrained matchup: a uniformly random not-yet-seen pair of
    /// whole proposals, ignoring the budget entirely. `None` once every
    /// pair has been voted on.
    pub fn next_pair(&self, rng: &mut impl Rng) -> Option<(Proposal, Proposal)> {
        next_unseen_pair(&self.proposals, &self.used_pairs, rng)
            .map(|(a, b)| (a.clone(), b.clone()))
    }

    /// Next budgeted matchup. `None` when no budget is set, or when the
    /// catalog cannot produce two distinct options for it.
    pub fn synthesize(&self, rng: &mut impl Rng) -> Option<(MatchupOption, MatchupOption)> {
        let budget = self.budget?;
        synthesize_matchup(&self.proposals, budget, rng)
    }

    /// Mode-dispatching matchup source: budgeted when a budget is set,
    /// otherwise an unconstrained pair wrapped as two singles.
    pub fn next_matchup(&self, rng: &mut impl Rng) -> Option<(MatchupOption, MatchupOption)> {
        if self.budget.is_some() {
            self.synthesize(rng)
        } else {
            self.next_pair(rng)
                .map(|(a, b)| (MatchupOption::Single(a), MatchupOption::Single(b)))
        }
    }

    /// Apply one decisive vote.
    ///
    /// Each side is reduced to a representative rating: a single's own
    /// rating, the mean of a combination's members, a share's base rating.
    /// All ratings are read from the canonical catalog, never from the
    /// copies embedded in the options. The Elo points won and lost then
    /// flow back: singles take their new rating directly, combination
    /// members shift proportionally to their cost share, and a share's
    /// base proposal absorbs the full unscaled delta.
    ///
    /// In unconstrained mode a vote between two plain singles records the
    /// pair as seen. Budget-mode votes never touch the exclusion set.
    ///
    /// Both sides are resolved before anything mutates; on error the
    /// session is unchanged and the vote is not counted.
    pub fn apply_vote(
        &mut self,
        winner: &MatchupOption,
        loser: &MatchupOption,
    ) -> Result<(), VoteError> {
        let winner_members = self.resolve(winner)?;
        let loser_members = self.resolve(loser)?;

        let winner_rep = self.representative_rating(winner, &winner_members);
        let loser_rep = self.representative_rating(loser, &loser_members);

        let (new_winner, new_loser) = update_ratings(winner_rep, loser_rep);
        let points_gained = new_winner - winner_rep;
        let points_lost = loser_rep - new_loser;

        match winner {
            MatchupOption::Single(_) => self.proposals[winner_members[0]].rating = new_winner,
            MatchupOption::Combination { members, total_cost } => {
                for (&idx, member) in winner_members.iter().zip(members) {
                    self.proposals[idx].rating += points_gained * (member.cost / *total_cost);
                }
            }
            MatchupOption::Share { .. } => self.proposals[winner_members[0]].rating += points_gained,
        }

        match loser {
            MatchupOption::Single(_) => self.proposals[loser_members[0]].rating = new_loser,
            MatchupOption::Combination { members, total_cost } => {
                for (&idx, member) in loser_members.iter().zip(members) {
                    self.proposals[idx].rating -= points_lost * (member.cost / *total_cost);
                }
            }
            MatchupOption::Share { .. } => self.proposals[loser_members[0]].rating -= points_lost,
        }

        if self.budget.is_none()
            && matches!(winner, MatchupOption::Single(_))
            && matches!(loser, MatchupOption::Single(_))
        {
            let key = pair_key(
                &self.proposals[winner_members[0]].id,
                &self.proposals[loser_members[0]].id,
            );
            self.used_pairs.insert(key);
        }

        self.vote_count += 1;
        Ok(())
    }

    /// Proposals ordered by rating, best first. Equal ratings keep their
    /// catalog order.
    pub fn rankings(&self) -> Vec<&Proposal> {
        let mut ranked: Vec<&Proposal> = self.proposals.iter().collect();
        ranked.sort_by(|a, b| {
            b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Map an option to catalog indices of the proposals it touches.
    fn resolve(&self, option: &MatchupOption) -> Result<Vec<usize>, VoteError> {
        let find = |id: &str| {
            self.proposals
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| VoteError::UnknownProposal(id.to_string()))
        };
        match option {
            MatchupOption::Single(p) => Ok(vec![find(&p.id)?]),
            MatchupOption::Combination { members, .. } => {
                if members.is_empty() {
                    return Err(VoteError::EmptyCombination);
                }
                members.iter().map(|p| find(&p.id)).collect()
            }
            MatchupOption::Share { base, .. } => Ok(vec![find(&base.id)?]),
        }
    }

    /// Representative rating for one side, read from the canonical catalog.
    fn representative_rating(&self, option: &MatchupOption, members: &[usize]) -> f64 {
        match option {
            MatchupOption::Combination { .. } => {
                let sum: f64 = members.iter().map(|&i| self.proposals[i].rating).sum();
                sum / members.len() as f64
            }
            _ => self.proposals[members[0]].rating,
        }
    }
}

fn normalize_ratings(mut catalog: Vec<Proposal>) -> Vec<Proposal> {
    for p in &mut catalog {
        if !p.rating.is_finite() || p.rating <= 0.0 {
            p.rating = INITIAL_RATING;
        }
    }
    catalog
}
