//! Pipeline components: discovery, shared scan state, scheduler, error summary.

pub mod context;
pub mod discover;
pub mod error_handler;
pub mod scheduler;

pub use context::ScanShared;
pub use discover::{compare_names, discover, resolve_ignore_paths};
pub use error_handler::{count_pending, report_row_errors};
pub use scheduler::{ScanHandle, determine_workers, scan};
