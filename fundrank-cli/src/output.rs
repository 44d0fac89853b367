//! Output formatting: matchup cards, the terminal ranking table, and JSON.

use fundrank_core::{MatchupOption, Session};
use serde::Serialize;

#[derive(Serialize)]
struct JsonProposal {
    rank: usize,
    id: String,
    name: String,
    cost: f64,
    rating: f64,
    status: String,
}

#[derive(Serialize)]
struct JsonOutput {
    proposals: Vec<JsonProposal>,
    vote_count: u64,
    budget: Option<f64>,
}

/// Format an amount with thousands separators and two decimals,
/// e.g. `1234567.5` -> `"1,234,567.50"`.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac:02}")
}

/// Render one matchup option as indented card lines (without the [1]/[2]
/// marker line, which the caller owns).
fn option_lines(option: &MatchupOption) -> Vec<String> {
    let mut lines = Vec::new();
    match option {
        MatchupOption::Single(p) => {
            lines.push(format!("Cost: {}", format_amount(p.cost)));
            if !p.purpose.is_empty() {
                lines.push(format!("Purpose: {}", p.purpose));
            }
            if !p.justification.is_empty() {
                lines.push(format!("Why: {}", p.justification));
            }
            if !p.status.is_empty() {
                lines.push(format!("Status: {}", p.status));
            }
        }
        MatchupOption::Combination { members, total_cost } => {
            lines.push(format!(
                "Combined cost: {} ({} proposals together)",
                format_amount(*total_cost),
                members.len()
            ));
            for member in members {
                if member.purpose.is_empty() {
                    lines.push(format!("- {} ({})", member.name, format_amount(member.cost)));
                } else {
                    lines.push(format!(
                        "- {} ({}): {}",
                        member.name,
                        format_amount(member.cost),
                        member.purpose
                    ));
                }
            }
        }
        MatchupOption::Share { base, percentage, cost } => {
            lines.push(format!(
                "Cost: {} ({:.1}% stake in a {} proposal)",
                format_amount(*cost),
                percentage * 100.0,
                format_amount(base.cost)
            ));
            if !base.purpose.is_empty() {
                lines.push(format!("Purpose: {}", base.purpose));
            }
            if !base.status.is_empty() {
                lines.push(format!("Status: {}", base.status));
            }
        }
    }
    lines
}

/// Print one matchup: a header with session context and a card per option.
pub fn print_matchup(a: &MatchupOption, b: &MatchupOption, budget: Option<f64>, votes: u64) {
    match budget {
        Some(budget) => println!(
            "Matchup (votes so far: {votes}, budget {})",
            format_amount(budget)
        ),
        None => println!("Matchup (votes so far: {votes})"),
    }
    for (marker, option) in [("[1]", a), ("[2]", b)] {
        println!();
        println!("  {marker} {}", option.label());
        for line in option_lines(option) {
            println!("      {line}");
        }
    }
}

/// Print current rankings as a formatted terminal table.
pub fn print_table(session: &Session) {
    let rankings = session.rankings();

    // Find the widest name and cost for padding
    let name_width = rankings
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(8)
        .max(8); // at least "Proposal"
    let cost_width = rankings
        .iter()
        .map(|p| format_amount(p.cost).len())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Cost"

    // Header
    println!(" # | {:<name_width$} | {:>cost_width$} | Rating | Status", "Proposal", "Cost");
    println!(
        "---|-{}-|-{}-|--------|--------",
        "-".repeat(name_width),
        "-".repeat(cost_width)
    );

    // Rows
    for (i, p) in rankings.iter().enumerate() {
        println!(
            "{:>2} | {:<name_width$} | {:>cost_width$} | {:>6} | {}",
            i + 1,
            p.name,
            format_amount(p.cost),
            p.rating.round() as i64,
            p.status,
        );
    }

    println!("\n{} proposals ranked across {} votes", rankings.len(), session.vote_count());
    if let Some(budget) = session.budget() {
        println!("Active budget: {}", format_amount(budget));
    }
}

/// Print current rankings as JSON.
pub fn print_json(session: &Session) {
    let proposals: Vec<JsonProposal> = session
        .rankings()
        .iter()
        .enumerate()
        .map(|(i, p)| JsonProposal {
            rank: i + 1,
            id: p.id.clone(),
            name: p.name.clone(),
            cost: p.cost,
            rating: p.rating,
            status: p.status.clone(),
        })
        .collect();

    let output = JsonOutput {
        proposals,
        vote_count: session.vote_count(),
        budget: session.budget(),
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}
