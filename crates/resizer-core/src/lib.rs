//! resizer-core - Grow and shrink array formulas to fit their results.
//!
//! The pieces, leaf to root:
//!
//! - [`guard`] - scoped echo, calculation-mode and selection overrides
//! - [`inspect`] - reading and normalising formulas
//! - [`pending`] - ranges with a rewrite in flight
//! - [`resize`] - deciding on and performing the rewrite
//! - [`invocation`] - the hook wrapping worksheet function calls
//!
//! All host access goes through the [`Host`] trait.

pub mod config;
pub mod error;
pub mod guard;
pub mod host;
pub mod inspect;
pub mod invocation;
pub mod pending;
pub mod pipeline;
pub mod resize;

#[cfg(test)]
mod testing;

pub use config::ResizerConfig;
pub use error::{ResizerError, Result};
pub use host::{CalculationMode, Host, MacroJob, ReferenceStyle, SheetLimits};
pub use invocation::InvocationGuard;
pub use pending::{PendingResizes, PendingSlot};
pub use pipeline::{ComputationError, ComputationResult, Flow, Invocation, InvocationHook, Pipeline};
pub use resize::{ResizeOutcome, ResultResizer, RewriteOutcome};

pub use resizer_engine::engine::{CellRange, CellRef, CellValue, Computation, SheetId, ValueGrid};
