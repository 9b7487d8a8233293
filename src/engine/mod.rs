//! Engine module: CLI arguments, run handler, live display and path tools

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, ColorChoice};
pub use cli::{handle_run, setup_opts};
pub use progress::{render_final, render_live};
pub use tools::{
    absolutize, expand_home, has_git_metadata, is_hidden_name, normalize_path, normalize_roots,
    path_relative_to,
};
