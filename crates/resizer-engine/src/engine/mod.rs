//! Resizer value and reference API.
//!
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`CellRange`], [`SheetId`] - Rectangular regions on a sheet
//! - [`CellValue`], [`ValueGrid`], [`Computation`] - Values returned by functions
//! - [`to_r1c1`], [`to_a1`] - Formula reference style conversion
//! - [`format_value`] - Format values for display

mod cell_ref;
mod format;
mod range;
mod reference;
mod value;

pub use cell_ref::CellRef;
pub use format::{format_number, format_value};
pub use range::{CellRange, SheetId};
pub use reference::{to_a1, to_r1c1};
pub use value::{CellValue, Computation, ErrorValue, ValueGrid};
