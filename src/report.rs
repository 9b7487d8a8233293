//! Row rendering: aligned, optionally colored table lines; live redraw; JSON.

use anyhow::{Context, Result};
use colored::{Color, Colorize};
use std::io::Write;

use crate::utils::config::{COLUMN_GAP, NESTED_INDENT, NESTED_PREFIX};
use crate::{BranchState, Candidate, ProbeResult, RemoteState, RowStatus, ScanRow};

pub struct Labels;

impl Labels {
    pub const PENDING: &'static str = "pending";
    pub const NOT_INIT: &'static str = "not-init";
    pub const UNKNOWN: &'static str = "unknown";
    pub const DETACHED: &'static str = "detached";
    pub const CLEAN: &'static str = "clean";
    pub const DIRTY: &'static str = "dirty";
    pub const NO_REMOTE: &'static str = "no-remote";
    pub const IN_SYNC: &'static str = "in-sync";
    pub const NO_UPSTREAM: &'static str = "no-upstream";
    pub const ERROR: &'static str = "error";
}

/// Cell text plus how to color it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    pub color: Option<Color>,
    pub dimmed: bool,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
            dimmed: false,
        }
    }

    fn dim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            dimmed: true,
        }
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }

    /// Padded to `width`; color codes are not counted.
    fn render(&self, width: usize, use_color: bool) -> String {
        let pad = " ".repeat(width.saturating_sub(self.width()));
        if !use_color || (self.color.is_none() && !self.dimmed) {
            return format!("{}{}", self.text, pad);
        }
        let mut s = self.text.as_str().normal();
        if let Some(c) = self.color {
            s = s.color(c);
        }
        if self.dimmed {
            s = s.dimmed();
        }
        format!("{}{}", s, pad)
    }
}

/// Name column: nested rows are indented and prefixed.
pub fn display_name(candidate: &Candidate) -> String {
    if candidate.level == 0 {
        return candidate.rel_path.display().to_string();
    }
    format!(
        "{}{}{}",
        NESTED_INDENT.repeat(candidate.level - 1),
        NESTED_PREFIX,
        candidate.name()
    )
}

/// `in-sync`, `ahead N`, `behind N`, `ahead N, behind M` or `no-upstream`.
pub fn sync_label(remote: &RemoteState) -> String {
    match remote {
        RemoteState::Remote {
            upstream: Some(_),
            ahead,
            behind,
        } => {
            let mut parts = Vec::new();
            if *ahead > 0 {
                parts.push(format!("ahead {ahead}"));
            }
            if *behind > 0 {
                parts.push(format!("behind {behind}"));
            }
            if parts.is_empty() {
                Labels::IN_SYNC.to_string()
            } else {
                parts.join(", ")
            }
        }
        _ => Labels::NO_UPSTREAM.to_string(),
    }
}

fn sync_color(remote: &RemoteState) -> Color {
    match remote {
        RemoteState::Remote {
            upstream: Some(_),
            behind,
            ahead,
        } => {
            if *behind > 0 {
                Color::Red
            } else if *ahead > 0 {
                Color::Yellow
            } else {
                Color::Green
            }
        }
        _ => Color::Yellow,
    }
}

/// Table renderer for scan rows.
pub struct Renderer {
    pub use_color: bool,
    /// Shown in the remote column when the remote exists.
    pub remote_label: String,
}

impl Renderer {
    pub fn new(use_color: bool, remote_label: impl Into<String>) -> Self {
        Self {
            use_color,
            remote_label: remote_label.into(),
        }
    }

    /// `[name, branch, state, remote, sync]` for one row.
    pub fn cells(&self, row: &ScanRow) -> [Cell; 5] {
        let name = Cell::plain(display_name(&row.candidate));
        let result = match &row.status {
            RowStatus::Pending => {
                return [
                    name,
                    Cell::dim(Labels::PENDING),
                    Cell::default(),
                    Cell::default(),
                    Cell::default(),
                ];
            }
            RowStatus::Done(result) => result,
        };
        match result {
            ProbeResult::NotRepository => [
                name,
                Cell::colored(Labels::NOT_INIT, Color::Yellow),
                Cell::default(),
                Cell::default(),
                Cell::default(),
            ],
            ProbeResult::Error { .. } => [
                name,
                Cell::colored(Labels::UNKNOWN, Color::Yellow),
                Cell::default(),
                Cell::default(),
                Cell::colored(Labels::ERROR, Color::Red),
            ],
            ProbeResult::Repository {
                branch,
                dirty,
                remote,
            } => {
                let branch = match branch {
                    BranchState::Named(b) => Cell::colored(b.as_str(), Color::Blue),
                    BranchState::Detached => Cell::colored(Labels::DETACHED, Color::Blue),
                };
                let state = if *dirty {
                    Cell::colored(Labels::DIRTY, Color::Red)
                } else {
                    Cell::colored(Labels::CLEAN, Color::Green)
                };
                let remote_cell = match remote {
                    RemoteState::NoRemote => Cell::colored(Labels::NO_REMOTE, Color::Red),
                    RemoteState::Remote { .. } => {
                        Cell::colored(self.remote_label.as_str(), Color::Cyan)
                    }
                };
                let sync = Cell::colored(sync_label(remote), sync_color(remote));
                [name, branch, state, remote_cell, sync]
            }
        }
    }

    /// Column widths; label columns have a floor so live redraws don't shift as rows resolve.
    fn widths(&self, table: &[[Cell; 5]]) -> [usize; 5] {
        let mut widths = [
            0,
            [Labels::PENDING, Labels::NOT_INIT, Labels::DETACHED, Labels::UNKNOWN]
                .iter()
                .map(|l| l.len())
                .max()
                .unwrap_or(0),
            Labels::CLEAN.len().max(Labels::DIRTY.len()),
            Labels::NO_REMOTE.len().max(self.remote_label.chars().count()),
            Labels::NO_UPSTREAM.len(),
        ];
        for cells in table {
            for (w, cell) in widths.iter_mut().zip(cells.iter()) {
                *w = (*w).max(cell.width());
            }
        }
        widths
    }

    /// One line per row, columns aligned, trailing padding trimmed.
    pub fn render_lines(&self, rows: &[ScanRow]) -> Vec<String> {
        let table: Vec<[Cell; 5]> = rows.iter().map(|r| self.cells(r)).collect();
        let widths = self.widths(&table);
        table
            .iter()
            .map(|cells| {
                let line = cells
                    .iter()
                    .zip(widths.iter())
                    .map(|(cell, w)| cell.render(*w, self.use_color))
                    .collect::<Vec<_>>()
                    .join(COLUMN_GAP);
                line.trim_end().to_string()
            })
            .collect()
    }

    pub fn print_block<W: Write>(&self, out: &mut W, rows: &[ScanRow]) -> Result<()> {
        for line in self.render_lines(rows) {
            writeln!(out, "{}", line).context("write rows")?;
        }
        out.flush().context("flush rows")
    }
}

/// Redraws the whole block in place on an interactive terminal.
pub struct LiveBlock {
    lines: usize,
}

impl LiveBlock {
    /// Print the initial block (all Pending, usually).
    pub fn start<W: Write>(renderer: &Renderer, out: &mut W, rows: &[ScanRow]) -> Result<Self> {
        renderer.print_block(out, rows)?;
        Ok(Self { lines: rows.len() })
    }

    /// Move the cursor back over the previous block and overwrite it.
    pub fn redraw<W: Write>(
        &mut self,
        renderer: &Renderer,
        out: &mut W,
        rows: &[ScanRow],
    ) -> Result<()> {
        if self.lines > 0 {
            write!(out, "\x1b[{}A", self.lines).context("move cursor")?;
        }
        for line in renderer.render_lines(rows) {
            writeln!(out, "\r\x1b[2K{}", line).context("write rows")?;
        }
        out.flush().context("flush rows")?;
        self.lines = rows.len();
        Ok(())
    }
}

/// Final rows as a JSON array.
pub fn render_json(rows: &[ScanRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("serialize rows")
}
