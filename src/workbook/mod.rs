//! In-memory workbook that plays the host application.
//!
//! [`MemoryHost`] implements the resizer's [`Host`](resizer_core::Host)
//! interface over named sheets, and [`Session`] drives it: entering
//! formulas, recalculating, and running the deferred-macro queue until the
//! workbook is idle.

mod formula;
mod host;
mod session;
mod state;

pub use formula::{Arg, Expr, parse_formula};
pub use session::Session;
pub use state::{Cell, Grid, MemoryHost};
