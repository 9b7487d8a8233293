//! Live display: show every row as pending, then redraw as results arrive.

use anyhow::Result;
use std::io::Write;

use crate::ScanRow;
use crate::pipeline::ScanHandle;
use crate::report::{LiveBlock, Renderer};

/// Drain `handle`'s updates, redrawing the block on `out` after each one.
/// Returns the final rows (Pending rows remain only if the scan was cancelled).
pub fn render_live<W: Write>(
    renderer: &Renderer,
    out: &mut W,
    handle: ScanHandle,
) -> Result<Vec<ScanRow>> {
    let mut block = LiveBlock::start(renderer, out, &handle.snapshot())?;
    for _update in handle.updates().iter() {
        block.redraw(renderer, out, &handle.snapshot())?;
    }
    let rows = handle.wait_all()?;
    block.redraw(renderer, out, &rows)?;
    Ok(rows)
}

/// Wait for the scan, then print the block once.
pub fn render_final<W: Write>(
    renderer: &Renderer,
    out: &mut W,
    handle: ScanHandle,
) -> Result<Vec<ScanRow>> {
    let rows = handle.wait_all()?;
    renderer.print_block(out, &rows)?;
    Ok(rows)
}
