//! Pairwise Elo ranking for budget proposals.
//!
//! A [`Session`] repeatedly offers the caller a matchup of two options and
//! applies one vote at a time. In unconstrained mode the options are whole
//! proposals and every unordered pair is shown at most once. With a budget
//! set, the synthesizer builds options whose effective cost lands within
//! 5% of the budget: proposals priced right, fractional shares of bigger
//! ones, and bundles of 2..=3 smaller ones.
//!
//! The crate does no IO and never touches a global RNG; every sampling
//! entry point takes `&mut impl Rng`, so a seeded generator replays a
//! session exactly. Persistence is the caller's job via [`Snapshot`].
//!
//! # Quick start
//!
//! ```
//! use fundrank_core::{MatchupOption, Proposal, Session};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut session = Session::new(vec![
//!     Proposal::new("roads", "Road resurfacing", 500_000.0),
//!     Proposal::new("clinic", "Clinic upgrade", 480_000.0),
//! ]);
//! let mut rng = SmallRng::seed_from_u64(7);
//!
//! let (first, second) = session.next_pair(&mut rng).expect("an unseen pair exists");
//! session
//!     .apply_vote(&MatchupOption::Single(first), &MatchupOption::Single(second))
//!     .expect("both sides are catalog proposals");
//!
//! let rankings = session.rankings();
//! assert_eq!(rankings[0].rating, 1516.0);
//! assert_eq!(rankings[1].rating, 1484.0);
//! ```

pub mod budget;
pub mod constants;
pub mod elo;
pub mod pairing;
pub mod session;
pub mod types;

// Re-export primary public API at crate root.
pub use budget::{MatchupPools, build_pools, synthesize_matchup};
pub use elo::{expected_score, update_ratings};
pub use pairing::next_unseen_pair;
pub use session::{Session, VoteError};
pub use types::{MatchupOption, Proposal, Snapshot, pair_key};
