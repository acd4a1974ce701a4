//! The host spreadsheet's command interface.
//!
//! Everything the coordinator does to the workbook goes through [`Host`]:
//! queries of UI and calculation state, commands that change it, and the
//! deferred-macro queue used to run rewrites outside a recalculation pass.
//! Methods take `&self`; implementations keep their state behind interior
//! mutability because the host is a single, globally visible application.

use resizer_engine::engine::{CellRange, CellValue};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Work queued to run once on the host's macro thread.
pub type MacroJob = Box<dyn FnOnce() + Send + 'static>;

/// Reference style the host displays formulas in.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ReferenceStyle {
    #[default]
    A1,
    R1C1,
}

#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CalculationMode {
    #[default]
    Automatic,
    SemiAutomatic,
    Manual,
}

/// Sheet geometry limits.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SheetLimits {
    pub max_rows: u32,
    pub max_columns: u32,
}

impl Default for SheetLimits {
    fn default() -> Self {
        SheetLimits {
            max_rows: 1_048_576,
            max_columns: 16_384,
        }
    }
}

impl SheetLimits {
    /// Whether the range's last row and column are on the sheet.
    pub fn contains(&self, range: &CellRange) -> bool {
        range.row_last < self.max_rows && range.col_last < self.max_columns
    }
}

pub trait Host: Send + Sync + 'static {
    /// Range of the formula currently being calculated, if any.
    fn caller(&self) -> Option<CellRange>;

    fn selection(&self) -> Result<CellRange>;
    fn active_cell(&self) -> Result<CellRange>;

    /// Formula text of the cell, in the current display style.
    fn cell_formula(&self, cell: &CellRange) -> Result<Option<String>>;
    /// Whether the cell is part of a legacy array formula.
    fn is_array_member(&self, cell: &CellRange) -> Result<bool>;
    fn reference_style(&self) -> Result<ReferenceStyle>;
    fn screen_echo(&self) -> Result<bool>;
    fn calculation_mode(&self) -> Result<CalculationMode>;
    fn sheet_name(&self, range: &CellRange) -> Result<String>;
    /// Convert `formula` from A1 to R1C1 references relative to `anchor`.
    fn convert_formula_to_r1c1(&self, formula: &str, anchor: &CellRange) -> Result<String>;
    /// Fully qualified reference text, e.g. `Sheet1!$A$1`.
    fn reference_text(&self, range: &CellRange) -> Result<String>;
    fn limits(&self) -> SheetLimits;

    fn set_screen_echo(&self, enabled: bool) -> Result<()>;
    fn set_calculation_mode(&self, mode: CalculationMode) -> Result<()>;
    fn select_workbook_sheet(&self, name: &str) -> Result<()>;
    fn select_range(&self, range: &CellRange, active_cell: Option<&CellRange>) -> Result<()>;
    /// Extend the selection to the whole array containing the active cell.
    fn select_special_current_array(&self) -> Result<()>;
    fn set_cell_value(&self, range: &CellRange, value: CellValue) -> Result<()>;
    /// Enter `formula_r1c1` as one legacy array formula over `range`.
    /// Fails when the range overlaps another array.
    fn enter_array_formula(&self, formula_r1c1: &str, range: &CellRange) -> Result<()>;
    fn show_alert(&self, message: &str) -> Result<()>;

    fn enqueue_deferred_macro(&self, job: MacroJob);
}
