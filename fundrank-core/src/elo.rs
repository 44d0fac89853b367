//! Elo rating math for pairwise proposal votes.
//!
//! Plain Elo with a fixed K-factor and whole-point rounding. Ratings are
//! `f64` because combination votes attribute fractional deltas to their
//! members; the pair update itself always lands on whole numbers.

use crate::constants::ELO_K_FACTOR;

/// Probability that a contestant rated `rating` beats one rated `opponent`,
/// under the standard Elo logistic curve (400-point scale).
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0))
}

/// Apply one decisive vote to a pair of ratings.
///
/// Returns `(new_winner, new_loser)`, each rounded to the nearest whole
/// point. With a very large rating gap the favourite's expected score is so
/// close to 1 that rounding can leave both ratings unchanged.
pub fn update_ratings(winner: f64, loser: f64) -> (f64, f64) {
    let winner_expected = expected_score(winner, loser);
    let loser_expected = expected_score(loser, winner);
    let new_winner = (winner + ELO_K_FACTOR * (1.0 - winner_expected)).round();
    let new_loser = (loser + ELO_K_FACTOR * (0.0 - loser_expected)).round();
    (new_winner, new_loser)
}
