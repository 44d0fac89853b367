//! Unconstrained pair selection.
//!
//! In unconstrained mode every vote compares two whole proposals, and the
//! session remembers which unordered pairs were already shown. Selection
//! enumerates the remaining pairs and picks one uniformly, so the mode
//! terminates after exactly `n * (n - 1) / 2` distinct votes.

use std::collections::HashSet;

use rand::Rng;

use crate::types::{Proposal, pair_key};

/// Pick a uniformly random proposal pair not yet present in `excluded`.
///
/// `excluded` holds canonical [`pair_key`] entries. Returns the pair in
/// catalog order (lower index first); presentation order is left to the
/// caller. `None` when fewer than two proposals exist or every pair has
/// been used up.
pub fn next_unseen_pair<'a>(
    proposals: &'a [Proposal],
    excluded: &HashSet<String>,
    rng: &mut impl Rng,
) -> Option<(&'a Proposal, &'a Proposal)> {
    if proposals.len() < 2 {
        return None;
    }

    let mut remaining: Vec<(usize, usize)> = Vec::new();
    for i in 0..proposals.len() {
        for j in (i + 1)..proposals.len() {
            if !excluded.contains(&pair_key(&proposals[i].id, &proposals[j].id)) {
                remaining.push((i, j));
            }
        }
    }

    if remaining.is_empty() {
        return None;
    }

    let (i, j) = remaining[rng.random_range(0..remaining.len())];
    Some((&proposals[i], &proposals[j]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Proposal;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn catalog(n: usize) -> Vec<Proposal> {
        (0..n)
            .map(|i| Proposal::new(format!("p{i}"), format!("Proposal {i}"), 100.0 * (i + 1) as f64))
            .collect()
    }

    #[test]
    fn test_needs_at_least_two_proposals() {
        let mut rng = SmallRng::seed_from_u64(1);
        let empty: Vec<Proposal> = Vec::new();
        assert!(next_unseen_pair(&empty, &HashSet::new(), &mut rng).is_none());
        assert!(next_unseen_pair(&catalog(1), &HashSet::new(), &mut rng).is_none());
    }

    #[test]
    fn test_pair_halves_are_always_distinct() {
        let proposals = catalog(5);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let (a, b) = next_unseen_pair(&proposals, &HashSet::new(), &mut rng).unwrap();
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn test_excluded_pairs_are_never_returned() {
        let proposals = catalog(4);
        let mut excluded = HashSet::new();
        excluded.insert(pair_key("p0", "p1"));
        excluded.insert(pair_key("p2", "p3"));

        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let (a, b) = next_unseen_pair(&proposals, &excluded, &mut rng).unwrap();
            assert!(!excluded.contains(&pair_key(&a.id, &b.id)));
        }
    }

    #[test]
    fn test_exhausts_after_all_pairs_are_used() {
        let proposals = catalog(4);
        let mut excluded = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(3);

        // 4 proposals -> 6 distinct pairs
        for votes in 0..6 {
            let (a, b) = next_unseen_pair(&proposals, &excluded, &mut rng)
                .unwrap_or_else(|| panic!("exhausted early after {votes} votes"));
            let inserted = excluded.insert(pair_key(&a.id, &b.id));
            assert!(inserted, "pair repeated before exhaustion");
        }
        assert!(next_unseen_pair(&proposals, &excluded, &mut rng).is_none());
    }

    #[test]
    fn test_returns_pairs_in_catalog_order() {
        let proposals = catalog(3);
        let index_of = |id: &str| proposals.iter().position(|p| p.id == id).unwrap();

        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..30 {
            let (a, b) = next_unseen_pair(&proposals, &HashSet::new(), &mut rng).unwrap();
            assert!(index_of(&a.id) < index_of(&b.id));
        }
    }
}
