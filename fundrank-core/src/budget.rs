//! Budget-constrained matchup synthesis.
//!
//! Given a budget B, the synthesizer builds three pools of options whose
//! effective cost lands inside the window `[0.95 * B, 1.05 * B]`:
//!
//!   * singles: proposals priced inside the window as-is
//!   * shares: fractional stakes in proposals too expensive for the window
//!   * combinations: bundles of 2..=3 cheaper proposals summing into it
//!
//! and then draws two distinct options with pool-level weights. The first
//! option comes from singles or shares only; combinations enter through the
//! second draw or the fallback paths. Presentation order of the final pair
//! is randomized.

use std::collections::HashSet;

use rand::Rng;

use crate::constants::{
    BUDGET_WINDOW_LOWER, BUDGET_WINDOW_UPPER, MAX_COMBINATION_SIZE, MAX_OPTION2_ATTEMPTS,
    MAX_SHARE_PERCENTAGE, MIN_SHARE_PERCENTAGE, OPTION1_SHARE_WEIGHT, OPTION1_SINGLE_WEIGHT,
    OPTION2_COMBINATION_WEIGHT, OPTION2_SHARE_WEIGHT, OPTION2_SINGLE_WEIGHT,
};
use crate::types::{MatchupOption, Proposal};

/// Candidate options for one budget, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct MatchupPools {
    pub singles: Vec<MatchupOption>,
    pub shares: Vec<MatchupOption>,
    pub combinations: Vec<MatchupOption>,
}

impl MatchupPools {
    /// Total number of candidate options across all three pools.
    pub fn len(&self) -> usize {
        self.singles.len() + self.shares.len() + self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the candidate pools for `budget`.
///
/// Window boundaries are inclusive on both sides. A proposal priced above
/// the window becomes a share only when the funded fraction
/// `budget / cost` falls inside `[0.50, 0.99]`, also inclusive; a share's
/// effective cost is the budget itself. Proposals cheaper than the window
/// only appear inside combinations.
pub fn build_pools(proposals: &[Proposal], budget: f64) -> MatchupPools {
    let window_min = budget * BUDGET_WINDOW_LOWER;
    let window_max = budget * BUDGET_WINDOW_UPPER;

    let mut pools = MatchupPools::default();

    for p in proposals {
        if p.cost >= window_min && p.cost <= window_max {
            pools.singles.push(MatchupOption::Single(p.clone()));
        } else if p.cost > window_max {
            let percentage = budget / p.cost;
            if (MIN_SHARE_PERCENTAGE..=MAX_SHARE_PERCENTAGE).contains(&percentage) {
                pools.shares.push(MatchupOption::Share {
                    base: p.clone(),
                    percentage,
                    cost: budget,
                });
            }
        }
    }

    pools.combinations = combinations_in_window(proposals, window_min, window_max);
    pools
}

/// Exhaustively enumerate combinations of 2..=3 proposals whose summed cost
/// lands inside the window.
///
/// Candidates are proposals priced at or below the window ceiling, sorted
/// by ID so enumeration order is deterministic. Subsets are explored
/// depth-first in index order; a branch is abandoned as soon as its partial
/// sum exceeds the ceiling, since costs are positive and adding members
/// only grows the sum. Duplicate member sets are collapsed through the
/// canonical combination ID.
fn combinations_in_window(
    proposals: &[Proposal],
    window_min: f64,
    window_max: f64,
) -> Vec<MatchupOption> {
    let mut candidates: Vec<&Proposal> = proposals.iter().filter(|p| p.cost <= window_max).collect();
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut members: Vec<usize> = Vec::with_capacity(MAX_COMBINATION_SIZE);
    extend_combination(
        &candidates,
        0,
        &mut members,
        0.0,
        window_min,
        window_max,
        &mut seen,
        &mut found,
    );
    found
}

#[allow(clippy::too_many_arguments)]
fn extend_combination(
    candidates: &[&Proposal],
    start: usize,
    members: &mut Vec<usize>,
    sum: f64,
    window_min: f64,
    window_max: f64,
    seen: &mut HashSet<String>,
    found: &mut Vec<MatchupOption>,
) {
    if members.len() >= 2 && sum >= window_min && sum <= window_max {
        let mut ids: Vec<&str> = members.iter().map(|&i| candidates[i].id.as_str()).collect();
        ids.sort_unstable();
        let key = format!("combo-{}", ids.join("-"));
        if seen.insert(key) {
            found.push(MatchupOption::Combination {
                members: members.iter().map(|&i| candidates[i].clone()).collect(),
                total_cost: sum,
            });
        }
    }
    if members.len() == MAX_COMBINATION_SIZE {
        return;
    }
    for i in start..candidates.len() {
        if sum + candidates[i].cost <= window_max {
            members.push(i);
            extend_combination(
                candidates,
                i + 1,
                members,
                sum + candidates[i].cost,
                window_min,
                window_max,
                seen,
                found,
            );
            members.pop();
        }
    }
}

/// One pool together with its selection weight.
struct WeightedPool<'a> {
    weight: f64,
    options: &'a [MatchupOption],
}

/// Draw one option: first a pool (weighted among the non-empty ones), then
/// a uniform option inside it. Empty pools are skipped entirely, so the
/// remaining weights renormalize implicitly. A zero weight total falls back
/// to a uniform pool choice. `None` only when every pool is empty.
fn pick_weighted<'a>(pools: &[WeightedPool<'a>], rng: &mut impl Rng) -> Option<&'a MatchupOption> {
    let available: Vec<&WeightedPool<'a>> = pools.iter().filter(|p| !p.options.is_empty()).collect();
    if available.is_empty() {
        return None;
    }

    let total: f64 = available.iter().map(|p| p.weight).sum();
    if total == 0.0 {
        let pool = available[rng.random_range(0..available.len())];
        return Some(&pool.options[rng.random_range(0..pool.options.len())]);
    }

    let mut roll = rng.random::<f64>() * total;
    for pool in &available {
        if roll < pool.weight {
            return Some(&pool.options[rng.random_range(0..pool.options.len())]);
        }
        roll -= pool.weight;
    }
    // roll drifted past the final pool; treat it as landing there
    let pool = available[available.len() - 1];
    Some(&pool.options[rng.random_range(0..pool.options.len())])
}

/// Draw two options with different IDs from one pool, in random order.
///
/// Index collisions are retried a bounded number of times, then resolved by
/// scanning for any ID-distinct pair. `None` when the pool cannot supply
/// two distinct options.
fn two_distinct_options(
    pool: &[MatchupOption],
    rng: &mut impl Rng,
) -> Option<(MatchupOption, MatchupOption)> {
    if pool.len() < 2 {
        return None;
    }

    let first = rng.random_range(0..pool.len());
    let mut second = rng.random_range(0..pool.len());
    let max_attempts = pool.len() * pool.len() + 20;
    let mut attempts = 0;
    while second == first && attempts < max_attempts {
        second = rng.random_range(0..pool.len());
        attempts += 1;
    }

    if second == first {
        for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                if pool[i].id() != pool[j].id() {
                    return Some(flip_order(pool[i].clone(), pool[j].clone(), rng));
                }
            }
        }
        return None;
    }

    Some(flip_order(pool[first].clone(), pool[second].clone(), rng))
}

fn flip_order(
    a: MatchupOption,
    b: MatchupOption,
    rng: &mut impl Rng,
) -> (MatchupOption, MatchupOption) {
    if rng.random::<f64>() < 0.5 { (a, b) } else { (b, a) }
}

/// Synthesize one budgeted matchup, or `None` when the catalog cannot
/// produce two distinct affordable options for this budget.
///
/// Option 1 is drawn from singles (weight 0.65) and shares (0.35). Option 2
/// is drawn from singles (0.45), shares (0.40), and combinations (0.25),
/// with option 1 removed from its own pool; draws that land on option 1's
/// ID anyway are retried up to [`MAX_OPTION2_ATTEMPTS`] times. When the
/// weighted draws cannot produce a distinct second option, two fallbacks
/// run in order: a single option 1 may face a uniformly chosen combination,
/// and failing that the matchup becomes two distinct combinations. The
/// returned pair is in randomized presentation order.
///
/// The bounded retry means a distinct second option can occasionally be
/// missed even though one exists; callers treat `None` as exhaustion for
/// this budget.
pub fn synthesize_matchup(
    proposals: &[Proposal],
    budget: f64,
    rng: &mut impl Rng,
) -> Option<(MatchupOption, MatchupOption)> {
    let pools = build_pools(proposals, budget);

    let option1 = match pick_weighted(
        &[
            WeightedPool { weight: OPTION1_SINGLE_WEIGHT, options: &pools.singles },
            WeightedPool { weight: OPTION1_SHARE_WEIGHT, options: &pools.shares },
        ],
        rng,
    ) {
        Some(option) => option.clone(),
        // No singles or shares anywhere in the window; the matchup can
        // still happen between two combinations.
        None => return two_distinct_options(&pools.combinations, rng),
    };
    let option1_id = option1.id();

    // Option 1 is filtered out of its own pool; the other pools stay whole.
    let (candidate_singles, candidate_shares) = match &option1 {
        MatchupOption::Single(_) => (
            filter_by_id(&pools.singles, &option1_id),
            pools.shares.clone(),
        ),
        MatchupOption::Share { .. } => (
            pools.singles.clone(),
            filter_by_id(&pools.shares, &option1_id),
        ),
        MatchupOption::Combination { .. } => (pools.singles.clone(), pools.shares.clone()),
    };

    let mut option2 = None;
    for _ in 0..MAX_OPTION2_ATTEMPTS {
        let candidate = pick_weighted(
            &[
                WeightedPool { weight: OPTION2_SINGLE_WEIGHT, options: &candidate_singles },
                WeightedPool { weight: OPTION2_SHARE_WEIGHT, options: &candidate_shares },
                WeightedPool { weight: OPTION2_COMBINATION_WEIGHT, options: &pools.combinations },
            ],
            rng,
        );
        if let Some(c) = candidate {
            if c.id() != option1_id {
                option2 = Some(c.clone());
                break;
            }
        }
    }

    if option2.is_none() {
        // A single may still face a uniformly chosen combination.
        if matches!(option1, MatchupOption::Single(_)) && !pools.combinations.is_empty() {
            let combo = &pools.combinations[rng.random_range(0..pools.combinations.len())];
            if combo.id() != option1_id {
                option2 = Some(combo.clone());
            }
        }
        if option2.is_none() {
            // Last resort: abandon option 1 and pit two combinations
            // against each other.
            let pair = two_distinct_options(&pools.combinations, rng)?;
            if pair.0.id() == option1_id || pair.1.id() == option1_id {
                return None;
            }
            return Some(pair);
        }
    }

    option2.map(|option2| flip_order(option1, option2, rng))
}

fn filter_by_id(pool: &[MatchupOption], exclude_id: &str) -> Vec<MatchupOption> {
    pool.iter().filter(|o| o.id() != exclude_id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Proposal;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn proposal(id: &str, cost: f64) -> Proposal {
        Proposal::new(id, id.to_uppercase(), cost)
    }

    #[test]
    fn test_pool_membership_boundaries_are_inclusive() {
        let budget = 1000.0;
        let proposals = vec![
            proposal("exact-lower", 950.0),
            proposal("exact-upper", 1050.0),
            proposal("below", 949.0),
            proposal("half-share", 2000.0),
            proposal("too-big", 2001.0),
        ];
        let pools = build_pools(&proposals, budget);

        let single_ids: Vec<String> = pools.singles.iter().map(|o| o.id()).collect();
        assert!(single_ids.contains(&"exact-lower".to_string()));
        assert!(single_ids.contains(&"exact-upper".to_string()));
        assert!(!single_ids.contains(&"below".to_string()));

        // 1000 / 2000 sits exactly on the 50% floor and is allowed;
        // 1000 / 2001 falls just under it.
        assert_eq!(pools.shares.len(), 1);
        match &pools.shares[0] {
            MatchupOption::Share { base, percentage, cost } => {
                assert_eq!(base.id, "half-share");
                assert!((percentage - 0.5).abs() < 1e-12);
                assert_eq!(*cost, budget);
            }
            other => panic!("expected share, got {other:?}"),
        }
    }

    #[test]
    fn test_share_pool_skips_proposals_inside_window() {
        let budget = 1000.0;
        // 1050 is in the window, so it must become a single, never a share,
        // even though 1000/1050 would be a valid percentage.
        let pools = build_pools(&[proposal("edge", 1050.0)], budget);
        assert_eq!(pools.singles.len(), 1);
        assert!(pools.shares.is_empty());
    }

    #[test]
    fn test_share_percentage_reflects_budget_fraction() {
        let budget = 1000.0;
        let cost = budget / 0.6;
        let pools = build_pools(&[proposal("big", cost)], budget);
        assert_eq!(pools.shares.len(), 1);
        match &pools.shares[0] {
            MatchupOption::Share { percentage, .. } => {
                assert!((percentage - 0.6).abs() < 1e-9);
            }
            other => panic!("expected share, got {other:?}"),
        }
    }

    #[test]
    fn test_combination_search_is_exhaustive() {
        let budget = 1000.0; // window [950, 1050]
        let proposals = vec![
            proposal("a", 500.0),
            proposal("b", 500.0),
            proposal("c", 500.0),
            proposal("d", 50.0),
        ];
        let pools = build_pools(&proposals, budget);

        // Pairs: a+b, a+c, b+c (1000 each). Triples: a+b+d, a+c+d, b+c+d
        // (1050, inclusive upper edge). a+b+c is pruned at 1500.
        let mut ids: Vec<String> = pools.combinations.iter().map(|o| o.id()).collect();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                "combo-a-b", "combo-a-b-d", "combo-a-c", "combo-a-c-d", "combo-b-c",
                "combo-b-c-d",
            ]
        );

        for combo in &pools.combinations {
            match combo {
                MatchupOption::Combination { members, total_cost } => {
                    assert!(members.len() >= 2 && members.len() <= MAX_COMBINATION_SIZE);
                    let sum: f64 = members.iter().map(|p| p.cost).sum();
                    assert!((sum - total_cost).abs() < 1e-9);
                    assert!(*total_cost >= 950.0 && *total_cost <= 1050.0);
                }
                other => panic!("expected combination, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_combination_members_and_totals_match_window() {
        let budget = 700.0; // window [665, 735]
        let proposals: Vec<Proposal> = (1..=8)
            .map(|i| proposal(&format!("p{i}"), 90.0 * i as f64))
            .collect();
        let pools = build_pools(&proposals, budget);
        assert!(!pools.combinations.is_empty());

        let mut seen = HashSet::new();
        for combo in &pools.combinations {
            assert!(seen.insert(combo.id()), "duplicate member set {}", combo.id());
            match combo {
                MatchupOption::Combination { members, total_cost } => {
                    assert!(members.len() <= MAX_COMBINATION_SIZE);
                    assert!(*total_cost >= 665.0 && *total_cost <= 735.0);
                }
                other => panic!("expected combination, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_synthesize_two_plain_singles() {
        let proposals = vec![proposal("p", 1000.0), proposal("q", 1000.0)];
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..20 {
            let (a, b) = synthesize_matchup(&proposals, 1000.0, &mut rng).unwrap();
            assert_ne!(a.id(), b.id());
            let mut ids = [a.id(), b.id()];
            ids.sort();
            assert_eq!(ids, ["p".to_string(), "q".to_string()]);
        }
    }

    #[test]
    fn test_synthesize_combination_only_catalog() {
        // Nothing in the window as a single or share, but plenty of pairs.
        let proposals = vec![
            proposal("a", 500.0),
            proposal("b", 500.0),
            proposal("c", 510.0),
        ];
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..20 {
            let (a, b) = synthesize_matchup(&proposals, 1000.0, &mut rng).unwrap();
            assert!(matches!(a, MatchupOption::Combination { .. }));
            assert!(matches!(b, MatchupOption::Combination { .. }));
            assert_ne!(a.id(), b.id());
        }
    }

    #[test]
    fn test_synthesize_exhaustion_returns_none() {
        // One affordable single and nothing else to face it.
        let proposals = vec![proposal("only", 1000.0), proposal("far", 10_000.0)];
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..20 {
            assert!(synthesize_matchup(&proposals, 1000.0, &mut rng).is_none());
        }
    }

    #[test]
    fn test_synthesize_empty_catalog_returns_none() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(synthesize_matchup(&[], 1000.0, &mut rng).is_none());
    }

    #[test]
    fn test_synthesize_options_are_always_distinct() {
        let proposals = vec![
            proposal("p1", 950.0),
            proposal("p2", 1000.0),
            proposal("p3", 1050.0),
            proposal("p4", 1500.0),
            proposal("p5", 1800.0),
            proposal("p6", 480.0),
            proposal("p7", 520.0),
            proposal("p8", 330.0),
        ];
        let mut rng = SmallRng::seed_from_u64(77);
        for _ in 0..200 {
            let (a, b) = synthesize_matchup(&proposals, 1000.0, &mut rng).unwrap();
            assert_ne!(a.id(), b.id());
            let window = 950.0..=1050.0;
            assert!(window.contains(&a.cost()), "cost {} outside window", a.cost());
            assert!(window.contains(&b.cost()), "cost {} outside window", b.cost());
        }
    }

    #[test]
    fn test_synthesize_mixes_option_kinds_and_orders() {
        // One single (1000) and one share candidate (1600 -> 62.5%): with
        // only two possible options every matchup is the same unordered
        // pair, so over many draws both kinds must appear in front.
        let proposals = vec![proposal("single", 1000.0), proposal("big", 1600.0)];
        let mut rng = SmallRng::seed_from_u64(123);
        let mut single_first = 0u32;
        let mut share_first = 0u32;
        for _ in 0..200 {
            let (a, b) = synthesize_matchup(&proposals, 1000.0, &mut rng).unwrap();
            match a {
                MatchupOption::Single(_) => single_first += 1,
                MatchupOption::Share { .. } => share_first += 1,
                MatchupOption::Combination { .. } => panic!("no combinations possible here"),
            }
            assert_ne!(a.id(), b.id());
        }
        assert!(single_first > 0);
        assert!(share_first > 0);
    }

    #[test]
    fn test_pick_weighted_skips_empty_pools() {
        let singles = vec![MatchupOption::Single(proposal("s", 10.0))];
        let empty: Vec<MatchupOption> = Vec::new();
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..20 {
            let picked = pick_weighted(
                &[
                    WeightedPool { weight: 0.0, options: &singles },
                    WeightedPool { weight: 1.0, options: &empty },
                ],
                &mut rng,
            )
            .unwrap();
            assert_eq!(picked.id(), "s");
        }
    }

    #[test]
    fn test_pick_weighted_empty_everything_is_none() {
        let empty: Vec<MatchupOption> = Vec::new();
        let mut rng = SmallRng::seed_from_u64(4);
        assert!(pick_weighted(&[WeightedPool { weight: 1.0, options: &empty }], &mut rng).is_none());
    }

    #[test]
    fn test_two_distinct_options_needs_two_entries() {
        let mut rng = SmallRng::seed_from_u64(8);
        let one = vec![MatchupOption::Single(proposal("solo", 10.0))];
        assert!(two_distinct_options(&one, &mut rng).is_none());
        assert!(two_distinct_options(&[], &mut rng).is_none());

        let two = vec![
            MatchupOption::Single(proposal("x", 10.0)),
            MatchupOption::Single(proposal("y", 10.0)),
        ];
        for _ in 0..20 {
            let (a, b) = two_distinct_options(&two, &mut rng).unwrap();
            assert_ne!(a.id(), b.id());
        }
    }
}
