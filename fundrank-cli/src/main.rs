mod catalog;
mod config;
mod output;
mod store;

use clap::Parser;
use fundrank_core::Session;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const DEFAULT_STATE_FILE: &str = "fundrank-state.json";

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "fundrank", version, about = "Rank budget proposals with pairwise Elo votes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run an interactive voting session
    Vote(VoteArgs),
    /// Print the current rankings
    Rankings(RankingsArgs),
    /// Delete the saved session state
    Reset(ResetArgs),
    /// Create a default config file at ~/.config/fundrank/config.toml
    Init,
}

#[derive(Parser)]
struct VoteArgs {
    /// Budget for this session; matchups are built within 5% of it
    #[arg(long)]
    budget: Option<f64>,

    /// Use the cost of this proposal (by id) as the budget
    #[arg(long, conflicts_with = "budget")]
    budget_from: Option<String>,

    /// Compare whole proposals with no budget, each pair at most once
    #[arg(long, conflicts_with_all = ["budget", "budget_from"])]
    unconstrained: bool,

    /// Catalog file: a JSON array of proposals (default: built-in demo catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Session state file (default: fundrank-state.json)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Stop after this many votes
    #[arg(long)]
    matchups: Option<usize>,

    /// RNG seed for a reproducible matchup sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Print final rankings as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show progress detail on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/fundrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct RankingsArgs {
    /// Catalog file (default: built-in demo catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Session state file (default: fundrank-state.json)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ~/.config/fundrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct ResetArgs {
    /// Session state file (default: fundrank-state.json)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Path to config file (default: ~/.config/fundrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

enum Choice {
    /// `true` picks option 1.
    Pick(bool),
    Skip,
    Quit,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Vote(args) => run_vote(args),
        Commands::Rankings(args) => run_rankings(args),
        Commands::Reset(args) => run_reset(args),
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default catalog, state file, and budget.");
        }
    }
}

/// Build the session: catalog from file or the built-in demo, state from
/// the snapshot file when one exists.
fn load_session(catalog_path: Option<&PathBuf>, state_path: &Path, verbose: bool) -> Session {
    let catalog = match catalog_path {
        Some(path) => catalog::load_file(path),
        None => catalog::load_demo(),
    };
    if verbose {
        eprintln!("Catalog: {} proposals", catalog.len());
    }

    match store::load_snapshot(state_path) {
        Some(snapshot) => {
            if verbose {
                eprintln!(
                    "Resuming from {} ({} votes so far)",
                    state_path.display(),
                    snapshot.vote_count
                );
            }
            Session::from_snapshot(catalog, snapshot)
        }
        None => Session::new(catalog),
    }
}

fn run_vote(args: VoteArgs) {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let catalog_path = args.catalog.clone().or_else(|| cfg.catalog.map(PathBuf::from));
    let state_path = args
        .state
        .clone()
        .or_else(|| cfg.state.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

    let mut session = load_session(catalog_path.as_ref(), &state_path, args.verbose);

    // Mode flags override the saved budget; with no flag at all, a saved
    // budget wins over the config default.
    if let Some(budget) = args.budget {
        if !budget.is_finite() || budget <= 0.0 {
            bail(format!("--budget must be a positive amount, got {budget}"));
        }
        session.set_budget(Some(budget));
    } else if let Some(ref id) = args.budget_from {
        let cost = session
            .proposals()
            .iter()
            .find(|p| p.id == *id)
            .map(|p| p.cost)
            .unwrap_or_else(|| {
                bail(format!("--budget-from: no proposal with id \"{id}\" in the catalog"))
            });
        session.set_budget(Some(cost));
    } else if args.unconstrained {
        session.set_budget(None);
    } else if session.budget().is_none() {
        if let Some(budget) = cfg.budget {
            if !budget.is_finite() || budget <= 0.0 {
                bail(format!(
                    "budget in {} must be a positive amount, got {budget}",
                    config_path.display()
                ));
            }
            session.set_budget(Some(budget));
        }
    }
    store::save_snapshot(&state_path, &session.snapshot());

    if args.verbose {
        match session.budget() {
            Some(b) => eprintln!("Budget mode: {}", output::format_amount(b)),
            None => eprintln!("Unconstrained mode: every pair offered once"),
        }
    }

    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut votes_this_run = 0usize;

    loop {
        if let Some(limit) = args.matchups {
            if votes_this_run >= limit {
                println!("\nReached {limit} votes for this run.");
                break;
            }
        }

        let (option_a, option_b) = match session.next_matchup(&mut rng) {
            Some(pair) => pair,
            None => {
                println!();
                if session.proposals().len() < 2 {
                    println!("The catalog needs at least 2 proposals to build a matchup.");
                } else {
                    match session.budget() {
                        Some(b) => println!(
                            "No matchup fits the budget of {}. Try a different budget, or vote --unconstrained.",
                            output::format_amount(b)
                        ),
                        None => println!("Every proposal pair has been compared. Session complete."),
                    }
                }
                break;
            }
        };

        println!();
        output::print_matchup(&option_a, &option_b, session.budget(), session.vote_count());
        println!();

        match read_choice(&mut lines) {
            Choice::Quit => {
                println!("Stopping. {votes_this_run} votes recorded this run.");
                break;
            }
            Choice::Skip => continue,
            Choice::Pick(first) => {
                let (winner, loser) =
                    if first { (&option_a, &option_b) } else { (&option_b, &option_a) };
                match session.apply_vote(winner, loser) {
                    Ok(()) => {
                        votes_this_run += 1;
                        if args.verbose {
                            eprintln!(
                                "Vote {}: \"{}\" over \"{}\"",
                                session.vote_count(),
                                winner.label(),
                                loser.label()
                            );
                        }
                        store::save_snapshot(&state_path, &session.snapshot());
                    }
                    Err(e) => eprintln!("Vote not counted: {e}"),
                }
            }
        }
    }

    println!();
    if args.json {
        output::print_json(&session);
    } else {
        output::print_table(&session);
    }
}

/// Prompt until the voter picks, skips, or quits. EOF counts as quit.
fn read_choice(lines: &mut impl Iterator<Item = io::Result<String>>) -> Choice {
    loop {
        print!("Your pick [1/2, s to skip, q to quit]: ");
        let _ = io::stdout().flush();

        match lines.next() {
            Some(Ok(line)) => match line.trim() {
                "1" => return Choice::Pick(true),
                "2" => return Choice::Pick(false),
                "s" | "S" => return Choice::Skip,
                "q" | "Q" => return Choice::Quit,
                "" => continue,
                other => {
                    println!("Unrecognized input \"{other}\". Use 1, 2, s, or q.");
                    continue;
                }
            },
            Some(Err(e)) => bail(format!("Failed to read from stdin: {e}")),
            None => return Choice::Quit,
        }
    }
}

fn run_rankings(args: RankingsArgs) {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let catalog_path = args.catalog.clone().or_else(|| cfg.catalog.map(PathBuf::from));
    let state_path = args
        .state
        .clone()
        .or_else(|| cfg.state.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

    let session = load_session(catalog_path.as_ref(), &state_path, false);

    if args.json {
        output::print_json(&session);
    } else {
        output::print_table(&session);
    }
}

fn run_reset(args: ResetArgs) {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let state_path = args
        .state
        .clone()
        .or_else(|| cfg.state.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

    if store::delete_snapshot(&state_path) {
        println!(
            "Deleted session state at {}. Ratings return to catalog values on the next run.",
            state_path.display()
        );
    } else {
        println!("No session state at {}; nothing to reset.", state_path.display());
    }
}
