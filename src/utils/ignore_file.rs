//! Ignore list: one folder path per line, `#` comments and blank lines skipped.

use log::{debug, warn};
use std::path::Path;

pub fn parse_ignore_entries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read entries from `path`. Missing file = empty list; unreadable file is logged.
pub fn load_ignore_entries(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => {
            let entries = parse_ignore_entries(&s);
            debug!("{} ignore entries from {}", entries.len(), path.display());
            entries
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            Vec::new()
        }
    }
}
