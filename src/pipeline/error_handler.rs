use log::warn;

use crate::{ProbeResult, ScanRow};

/// After a scan: warn about rows that ended in Error, and list them when verbose.
/// Returns the number of error rows.
pub fn report_row_errors(rows: &[ScanRow], verbose: bool) -> usize {
    let errors: Vec<(&ScanRow, &str)> = rows
        .iter()
        .filter_map(|row| match row.result() {
            Some(ProbeResult::Error { message }) => Some((row, message.as_str())),
            _ => None,
        })
        .collect();
    if !errors.is_empty() {
        warn!("{} folders could not be checked", errors.len());
        if verbose {
            for (row, message) in &errors {
                eprintln!("  {}: {}", row.candidate.path.display(), message);
            }
        }
    }
    errors.len()
}

/// Rows left Pending (only possible after cancellation).
pub fn count_pending(rows: &[ScanRow]) -> usize {
    rows.iter().filter(|r| r.result().is_none()).count()
}
