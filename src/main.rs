//! repo-check CLI: report Git status for every subfolder of the configured roots.

use anyhow::Result;
use clap::Parser;
use repo_check::engine::arg_parser::Cli;
use repo_check::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
