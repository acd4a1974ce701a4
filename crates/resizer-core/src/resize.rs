//! Resizing an array formula to the shape of its result.
//!
//! [`ResultResizer::request_resize`] runs inside a recalculation pass, where
//! the host forbids structural edits. It only decides whether a resize is
//! needed and, if so, queues [`rewrite`] as a deferred macro. The rewrite
//! runs later on the host's macro thread with screen echo off and manual
//! calculation, clears any old array block, and re-enters the formula over
//! the new range.

use std::sync::Arc;

use log::{debug, info, warn};
use resizer_engine::engine::{CellRange, CellValue, ValueGrid};

use crate::config::ResizerConfig;
use crate::error::{ResizerError, Result};
use crate::guard::{EchoOff, ManualCalculation, SelectionScope};
use crate::host::Host;
use crate::inspect::FormulaInspector;
use crate::pending::PendingResizes;

/// What a resize request decided. Every variant except `Scheduled` is a
/// silent no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The result has no rows or no columns.
    EmptyResult,
    /// The caller already has the result's shape.
    AlreadySized,
    /// The resized range would run off the sheet.
    OutOfBounds(CellRange),
    /// A rewrite of the same range is still in flight.
    AlreadyPending(CellRange),
    /// A rewrite into this range was queued.
    Scheduled(CellRange),
}

/// What a deferred rewrite did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The formula now spans the target range.
    Resized(CellRange),
    /// The host rejected the array formula; the user was alerted and the
    /// formula text was kept as literal text in the first cell.
    Conflict { address: String },
    /// The first cell no longer holds a formula.
    NoFormula,
}

pub struct ResultResizer<H: Host> {
    host: Arc<H>,
    pending: Arc<PendingResizes>,
    config: Arc<ResizerConfig>,
}

impl<H: Host> Clone for ResultResizer<H> {
    fn clone(&self) -> Self {
        ResultResizer {
            host: Arc::clone(&self.host),
            pending: Arc::clone(&self.pending),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: Host> ResultResizer<H> {
    pub fn new(host: Arc<H>, pending: Arc<PendingResizes>, config: Arc<ResizerConfig>) -> Self {
        ResultResizer {
            host,
            pending,
            config,
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn pending(&self) -> &Arc<PendingResizes> {
        &self.pending
    }

    pub fn config(&self) -> &ResizerConfig {
        &self.config
    }

    /// Resize `caller` to the shape of `grid` if needed.
    pub fn resize_to_fit(&self, caller: &CellRange, grid: &ValueGrid) -> ResizeOutcome {
        self.request_resize(caller, grid.rows(), grid.columns())
    }

    /// Queue a rewrite of the formula at `caller` into a `rows` x `columns`
    /// range starting at the caller's first cell.
    pub fn request_resize(&self, caller: &CellRange, rows: usize, columns: usize) -> ResizeOutcome {
        if rows == 0 || columns == 0 {
            return ResizeOutcome::EmptyResult;
        }
        if caller.rows() as usize == rows && caller.columns() as usize == columns {
            return ResizeOutcome::AlreadySized;
        }

        let rows = u32::try_from(rows).unwrap_or(u32::MAX);
        let columns = u32::try_from(columns).unwrap_or(u32::MAX);
        let target = caller.resized(rows, columns);

        let limits = self.host.limits();
        if !limits.contains(&target) {
            debug!(
                "{}",
                ResizerError::SheetBoundsExceeded {
                    range: target,
                    limits
                }
            );
            return ResizeOutcome::OutOfBounds(target);
        }

        let Some(slot) = self.pending.acquire(target) else {
            debug!("{}", ResizerError::RangeAlreadyPending(target));
            return ResizeOutcome::AlreadyPending(target);
        };

        let host = Arc::clone(&self.host);
        let config = Arc::clone(&self.config);
        self.host.enqueue_deferred_macro(Box::new(move || {
            // Held until the rewrite has finished, whatever its outcome.
            let _slot = slot;
            match rewrite(host.as_ref(), &target, &config) {
                Ok(RewriteOutcome::Resized(range)) => info!("resized array formula to {}", range),
                Ok(RewriteOutcome::Conflict { address }) => {
                    warn!("{}", ResizerError::ArrayEntryConflict { address })
                }
                Ok(RewriteOutcome::NoFormula) => {
                    debug!("no formula left at {}; resize dropped", target.first_cell())
                }
                Err(e) => warn!("resize of {} failed: {}", target, e),
            }
        }));
        debug!("scheduled resize of {} to {}", caller, target);
        ResizeOutcome::Scheduled(target)
    }
}

/// Re-enter the formula found at the first cell of `target` as an array
/// formula over all of `target`. Must run on the host's macro thread.
pub fn rewrite<H: Host + ?Sized>(
    host: &H,
    target: &CellRange,
    config: &ResizerConfig,
) -> Result<RewriteOutcome> {
    let _echo = EchoOff::new(host)?;
    let _calculation = ManualCalculation::new(host)?;

    let first_cell = target.first_cell();
    let inspector = FormulaInspector::new(host);
    let formula = match inspector.read_formula(&first_cell) {
        Ok(formula) => formula,
        Err(ResizerError::MissingFormula) => return Ok(RewriteOutcome::NoFormula),
        Err(e) => return Err(e),
    };

    // A legacy array formula cannot be redefined in place.
    if formula.is_array {
        clear_array_at(host, &first_cell)?;
    }

    let normalized = inspector.to_r1c1_style(&formula, &first_cell)?;
    if let Err(e) = host.enter_array_formula(&normalized.text, target) {
        debug!("array formula rejected for {}: {}", target, e);
        // Keep the formula text before anything else can fail; a legacy
        // array has already been cleared at this point.
        host.set_cell_value(&first_cell, CellValue::Text(config.literal_text(&formula.text)))?;
        let address = host.reference_text(&first_cell).unwrap_or_else(|e| {
            warn!("cannot resolve address of {}: {}", first_cell, e);
            first_cell.to_a1()
        });
        if let Err(e) = host.show_alert(&config.conflict_alert(&address)) {
            warn!("cannot show conflict alert: {}", e);
        }
        return Ok(RewriteOutcome::Conflict { address });
    }

    Ok(RewriteOutcome::Resized(*target))
}

/// Clear the whole array block containing `cell`.
fn clear_array_at<H: Host + ?Sized>(host: &H, cell: &CellRange) -> Result<()> {
    let _selection = SelectionScope::new(host, cell)?;
    host.select_special_current_array()?;
    let block = host.selection()?;
    host.set_cell_value(&block, CellValue::Empty)
}
