//! Catalog loading and validation.
//!
//! A catalog is a JSON array of proposals. The binary ships with a small
//! demo catalog so the tool works out of the box; real use points
//! --catalog (or the config file) at a file with the same shape.

use std::collections::HashSet;
use std::path::Path;

use fundrank_core::Proposal;

use crate::bail;

const DEMO_CATALOG: &str = include_str!("catalog.json");

/// The built-in demo catalog.
pub fn load_demo() -> Vec<Proposal> {
    parse_catalog(DEMO_CATALOG)
        .unwrap_or_else(|e| bail(format!("Built-in demo catalog is broken: {e}")))
}

/// Load and validate a catalog file.
pub fn load_file(path: &Path) -> Vec<Proposal> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read catalog {}: {e}", path.display())));
    parse_catalog(&content)
        .unwrap_or_else(|e| bail(format!("Invalid catalog {}: {e}", path.display())))
}

fn parse_catalog(content: &str) -> Result<Vec<Proposal>, String> {
    let proposals: Vec<Proposal> = serde_json::from_str(content).map_err(|e| e.to_string())?;
    validate(&proposals)?;
    Ok(proposals)
}

/// Reject catalogs the engine cannot rank sensibly: blank or duplicate IDs,
/// and costs that are not positive finite numbers.
fn validate(proposals: &[Proposal]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for p in proposals {
        if p.id.trim().is_empty() {
            return Err(format!("proposal \"{}\" has an empty id", p.name));
        }
        if !seen.insert(p.id.as_str()) {
            return Err(format!("duplicate proposal id \"{}\"", p.id));
        }
        if !p.cost.is_finite() || p.cost <= 0.0 {
            return Err(format!("proposal \"{}\" has invalid cost {}", p.id, p.cost));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_parses_and_validates() {
        let proposals = parse_catalog(DEMO_CATALOG).unwrap();
        assert!(proposals.len() >= 2);
        // Ratings are omitted in the demo file and default in.
        assert!(proposals.iter().all(|p| p.rating == 1500.0));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[
            {"id": "a", "name": "A", "cost": 10.0},
            {"id": "a", "name": "A again", "cost": 20.0}
        ]"#;
        let err = parse_catalog(json).unwrap_err();
        assert!(err.contains("duplicate"), "unexpected error: {err}");
    }

    #[test]
    fn test_rejects_non_positive_cost() {
        let json = r#"[{"id": "a", "name": "A", "cost": 0.0}]"#;
        assert!(parse_catalog(json).is_err());
        let json = r#"[{"id": "a", "name": "A", "cost": -5.0}]"#;
        assert!(parse_catalog(json).is_err());
    }

    #[test]
    fn test_rejects_blank_id() {
        let json = r#"[{"id": "  ", "name": "A", "cost": 10.0}]"#;
        assert!(parse_catalog(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(parse_catalog("not json").is_err());
        assert!(parse_catalog(r#"{"id": "a"}"#).is_err());
    }
}
