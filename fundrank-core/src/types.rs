use crate::constants::INITIAL_RATING;

/// A budget proposal as loaded from a catalog.
///
/// Proposals are identified by caller-provided string IDs. `cost` is assumed
/// positive and in a single consistent currency unit; the engine never
/// converts or rescales it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proposal {
    /// Stable identifier. Also the identity used for vote attribution,
    /// pair-exclusion keys, and combination/share IDs.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Full cost of the proposal.
    pub cost: f64,
    /// One-line summary of what the money buys.
    #[cfg_attr(feature = "serde", serde(default))]
    pub purpose: String,
    /// Why the proposal matters, shown alongside `purpose` in matchups.
    #[cfg_attr(feature = "serde", serde(default))]
    pub justification: String,
    /// Free-form lifecycle tag ("Proposed", "Ongoing", ...). Not interpreted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: String,
    /// Current Elo rating. Catalogs may omit this; it defaults to 1500.
    #[cfg_attr(feature = "serde", serde(default = "default_rating"))]
    pub rating: f64,
}

#[cfg(feature = "serde")]
fn default_rating() -> f64 {
    INITIAL_RATING
}

impl Proposal {
    /// Bare proposal at the initial rating, with empty descriptive fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: f64) -> Self {
        Proposal {
            id: id.into(),
            name: name.into(),
            cost,
            purpose: String::new(),
            justification: String::new(),
            status: String::new(),
            rating: INITIAL_RATING,
        }
    }
}

/// One side of a matchup presented to the voter.
///
/// Every option carries owned copies of the proposals it was built from.
/// Those copies describe the option (names, costs); authoritative ratings
/// always live in the session, which resolves options back to catalog
/// proposals by ID at vote time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchupOption {
    /// A proposal funded in full.
    Single(Proposal),
    /// Two or three proposals funded together.
    Combination {
        members: Vec<Proposal>,
        /// Sum of member costs, precomputed by the synthesizer.
        total_cost: f64,
    },
    /// A fractional stake in one proposal too expensive to fund outright.
    Share {
        base: Proposal,
        /// Funded fraction of the base proposal, in `[0.50, 0.99]`.
        percentage: f64,
        /// Effective cost of the stake. Equals the budget it was built for.
        cost: f64,
    },
}

impl MatchupOption {
    /// Identity of the option, unique within one synthesized matchup.
    ///
    /// Singles use the proposal ID as-is. Combinations use
    /// `combo-<sorted member ids joined by "-">` so that the same member set
    /// always yields the same ID regardless of discovery order. Shares use
    /// `share-<round(percentage * 10000)>-<base id>`.
    pub fn id(&self) -> String {
        match self {
            MatchupOption::Single(p) => p.id.clone(),
            MatchupOption::Combination { members, .. } => {
                let mut ids: Vec<&str> = members.iter().map(|p| p.id.as_str()).collect();
                ids.sort_unstable();
                format!("combo-{}", ids.join("-"))
            }
            MatchupOption::Share { base, percentage, .. } => {
                format!("share-{}-{}", (percentage * 10000.0).round() as i64, base.id)
            }
        }
    }

    /// Human-readable label, e.g. `"Harbor dredging"`,
    /// `"Road resurfacing + School roofs"`, `"52.5% of Harbor dredging"`.
    pub fn label(&self) -> String {
        match self {
            MatchupOption::Single(p) => p.name.clone(),
            MatchupOption::Combination { members, .. } => {
                let names: Vec<&str> = members.iter().map(|p| p.name.as_str()).collect();
                names.join(" + ")
            }
            MatchupOption::Share { base, percentage, .. } => {
                format!("{:.1}% of {}", percentage * 100.0, base.name)
            }
        }
    }

    /// Effective cost of the option: full cost for singles, summed cost for
    /// combinations, the budget-sized stake for shares.
    pub fn cost(&self) -> f64 {
        match self {
            MatchupOption::Single(p) => p.cost,
            MatchupOption::Combination { total_cost, .. } => *total_cost,
            MatchupOption::Share { cost, .. } => *cost,
        }
    }
}

impl From<Proposal> for MatchupOption {
    fn from(proposal: Proposal) -> Self {
        MatchupOption::Single(proposal)
    }
}

/// Canonical key for an unordered pair of proposal IDs.
///
/// `pair_key("b", "a") == pair_key("a", "b") == "a-b"`. Used by the
/// pair-exclusion set so a pair is recognized in either presentation order.
pub fn pair_key(id1: &str, id2: &str) -> String {
    let mut ids = [id1, id2];
    ids.sort_unstable();
    ids.join("-")
}

/// Serializable session state.
///
/// Field names follow the persisted JSON document: `programmes`,
/// `voteCount`, `usedPairs`, `currentBudget`. Older state files written
/// without a budget load with `currentBudget` absent, which maps to `None`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    /// Full catalog with current ratings.
    pub programmes: Vec<Proposal>,
    /// Votes applied over the lifetime of the session.
    pub vote_count: u64,
    /// Canonical `pair_key` entries for pairs already compared in
    /// unconstrained mode.
    #[cfg_attr(feature = "serde", serde(default))]
    pub used_pairs: Vec<String>,
    /// Active budget, if the session was in budget mode.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_budget: Option<f64>,
}
