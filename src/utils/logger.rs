//! stderr logging. Info lines carry only the package tag; warnings, errors and debug lines also
//! name the module they came from.

use colored::Colorize;
use env_logger::Builder;
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};
use std::io::{self, Write};

use crate::utils::config::PackagePaths;

/// `repo_check::pipeline::discover` → `pipeline::discover`.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(concat!(env!("CARGO_CRATE_NAME"), "::"))
        .unwrap_or(target)
}

fn format_record(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let name = PackagePaths::get().pkg_name().cyan();
    let target = short_target(record.target());
    match record.level() {
        Level::Error => writeln!(
            buf,
            "[{} {} {}] {}",
            name,
            "ERROR".red(),
            target.white(),
            record.args()
        ),
        Level::Warn => writeln!(
            buf,
            "[{} {} {}] {}",
            name,
            "WARN".yellow(),
            target.white(),
            record.args()
        ),
        Level::Info => writeln!(buf, "[{}] {}", name, record.args()),
        Level::Debug | Level::Trace => {
            writeln!(buf, "[{} {}] {}", name, target.dimmed(), record.args())
        }
    }
}

/// Install the logger once; later calls (tests, library callers with their own logger) are no-ops.
/// `RUST_LOG` still applies on top.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // dependencies: warnings only
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .format(format_record)
        .try_init();
}
