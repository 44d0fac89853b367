//! Session state persistence.
//!
//! One JSON document per session, written after every vote. A corrupt or
//! unreadable state file is reported and treated as absent rather than
//! aborting the run; a failed write costs at most the most recent vote.

use std::path::Path;

use fundrank_core::Snapshot;

use crate::bail;

/// Load a snapshot if one exists. Missing file means a fresh session;
/// anything unreadable or unparseable is reported and also treated as
/// fresh, leaving the broken file in place for inspection.
pub fn load_snapshot(path: &Path) -> Option<Snapshot> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            eprintln!(
                "Warning: could not read state file {}: {e}. Starting fresh.",
                path.display()
            );
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            eprintln!(
                "Warning: state file {} is not valid session state ({e}). Starting fresh.",
                path.display()
            );
            None
        }
    }
}

/// Write a snapshot. Failures are warnings, not fatal: losing one save
/// only loses the latest vote.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) {
    let json = match serde_json::to_string_pretty(snapshot) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Warning: could not serialize session state: {e}");
            return;
        }
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!(
                    "Warning: could not create state directory {}: {e}",
                    parent.display()
                );
                return;
            }
        }
    }
    if let Err(e) = std::fs::write(path, json) {
        eprintln!("Warning: could not write state file {}: {e}", path.display());
    }
}

/// Delete the state file. Missing file is fine; any other failure is fatal
/// since the user explicitly asked for the reset.
pub fn delete_snapshot(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => bail(format!("Failed to delete state file {}: {e}", path.display())),
    }
}
