pub mod config;
pub mod fd_limit;
pub mod ignore_file;
pub mod logger;
pub mod settings_file;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, determine_workers_given_fd_limit, max_workers_by_fd_limit};
pub use ignore_file::{load_ignore_entries, parse_ignore_entries};
pub use logger::setup_logging;
pub use settings_file::{
    SettingsFile, apply_file_to_opts, ensure_settings_file, load_settings_file, parse_settings,
};
