/// Elo rating assigned to every proposal that has not been voted on yet.
pub const INITIAL_RATING: f64 = 1500.0;

/// Elo K-factor. 32 keeps single votes impactful for catalogs in the
/// tens-of-proposals range; individual ratings move by at most 16 points
/// per vote from an even matchup.
pub const ELO_K_FACTOR: f64 = 32.0;

/// Lower edge of the budget window, as a fraction of the budget.
/// A matchup option is considered affordable when its effective cost lands
/// inside `[budget * LOWER, budget * UPPER]`, boundaries included.
pub const BUDGET_WINDOW_LOWER: f64 = 0.95;

/// Upper edge of the budget window, as a fraction of the budget.
pub const BUDGET_WINDOW_UPPER: f64 = 1.05;

/// Largest number of proposals that may be bundled into one combination.
///
/// Two or three proposals per bundle keeps the matchup readable for a voter
/// and bounds the subset search; with size capped at 3 the search visits
/// O(n^3) partial sums in the worst case, which is instant for the catalog
/// sizes this engine targets.
pub const MAX_COMBINATION_SIZE: usize = 3;

/// Smallest partial-funding share worth offering. Anything below half of a
/// proposal reads as a different (smaller) project rather than a funding
/// level for the same one. A share of exactly 50% is allowed.
pub const MIN_SHARE_PERCENTAGE: f64 = 0.50;

/// Largest partial-funding share worth offering. Shares above 99% are
/// indistinguishable from fully funding the proposal.
pub const MAX_SHARE_PERCENTAGE: f64 = 0.99;

/// Weight of the singles pool when drawing the first option of a budgeted
/// matchup. The first draw never produces a combination; combinations only
/// appear as the second option or through the fallback paths.
pub const OPTION1_SINGLE_WEIGHT: f64 = 0.65;

/// Weight of the shares pool when drawing the first option.
pub const OPTION1_SHARE_WEIGHT: f64 = 0.35;

/// Weight of the singles pool when drawing the second option.
pub const OPTION2_SINGLE_WEIGHT: f64 = 0.45;

/// Weight of the shares pool when drawing the second option.
pub const OPTION2_SHARE_WEIGHT: f64 = 0.40;

/// Weight of the combinations pool when drawing the second option.
pub const OPTION2_COMBINATION_WEIGHT: f64 = 0.25;

/// How many weighted draws to attempt for the second option before giving
/// up and switching to the fallback paths. Draws that land on the first
/// option's id are rejected and retried.
pub const MAX_OPTION2_ATTEMPTS: usize = 10;
