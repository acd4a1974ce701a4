//! Error types for the resizer coordinator.

use resizer_engine::engine::CellRange;
use thiserror::Error;

use crate::host::SheetLimits;

/// Errors that can occur while coordinating a resize.
///
/// None of these escape the coordinator: each one is recovered into a
/// sentinel value, a silent no-op, or a host alert.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResizerError {
    #[error("Cell has no formula")]
    MissingFormula,

    #[error("Formula too long: {length} characters (max {max})")]
    FormulaTooLong { length: usize, max: usize },

    #[error("{0}")]
    Computation(String),

    #[error("Range {range} exceeds sheet limits ({} rows x {} columns)", .limits.max_rows, .limits.max_columns)]
    SheetBoundsExceeded { range: CellRange, limits: SheetLimits },

    #[error("Resize of {0} already pending")]
    RangeAlreadyPending(CellRange),

    #[error("Cannot enter array formula at {address}")]
    ArrayEntryConflict { address: String },

    #[error("Host call {call} failed: {message}")]
    Host { call: &'static str, message: String },
}

impl ResizerError {
    pub fn host(call: &'static str, message: impl Into<String>) -> Self {
        ResizerError::Host {
            call,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResizerError>;
