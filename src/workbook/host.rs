use log::info;
use resizer_core::guard::Selection;
use resizer_core::{
    CalculationMode, Host, MacroJob, ReferenceStyle, ResizerError, SheetLimits,
};
use resizer_engine::engine::{CellRange, CellRef, CellValue, to_a1, to_r1c1};

use super::state::{Cell, MemoryHost};
use crate::error::WorkbookError;

type HostResult<T> = resizer_core::Result<T>;

fn host_error(call: &'static str, err: WorkbookError) -> ResizerError {
    ResizerError::host(call, err.to_string())
}

/// `$A$1` or `$A$1:$B$2`.
fn absolute_a1(range: &CellRange) -> String {
    let cell = |col: u32, row: u32| format!("${}${}", CellRef::col_to_letters(col), row as u64 + 1);
    let first = cell(range.col_first, range.row_first);
    if range.is_single_cell() {
        first
    } else {
        format!("{}:{}", first, cell(range.col_last, range.row_last))
    }
}

fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

impl Host for MemoryHost {
    fn caller(&self) -> Option<CellRange> {
        self.ui().caller
    }

    fn selection(&self) -> HostResult<CellRange> {
        Ok(self.current_selection().range)
    }

    fn active_cell(&self) -> HostResult<CellRange> {
        Ok(self.current_selection().active_cell)
    }

    fn cell_formula(&self, cell: &CellRange) -> HostResult<Option<String>> {
        self.sheet(cell.sheet).map_err(|e| host_error("cell_formula", e))?;
        Ok(self.display_formula(cell.sheet, cell.top_left()))
    }

    fn is_array_member(&self, cell: &CellRange) -> HostResult<bool> {
        self.sheet(cell.sheet).map_err(|e| host_error("is_array_member", e))?;
        Ok(self.array_block(cell.sheet, cell.top_left()).is_some())
    }

    fn reference_style(&self) -> HostResult<ReferenceStyle> {
        Ok(MemoryHost::reference_style(self))
    }

    fn screen_echo(&self) -> HostResult<bool> {
        Ok(MemoryHost::screen_echo(self))
    }

    fn calculation_mode(&self) -> HostResult<CalculationMode> {
        Ok(MemoryHost::calculation_mode(self))
    }

    fn sheet_name(&self, range: &CellRange) -> HostResult<String> {
        self.sheet(range.sheet)
            .map(|sheet| sheet.name.clone())
            .map_err(|e| host_error("sheet_name", e))
    }

    fn convert_formula_to_r1c1(&self, formula: &str, anchor: &CellRange) -> HostResult<String> {
        Ok(to_r1c1(formula, anchor.top_left()))
    }

    fn reference_text(&self, range: &CellRange) -> HostResult<String> {
        let name = Host::sheet_name(self, range)?;
        Ok(format!("{}!{}", quote_sheet_name(&name), absolute_a1(range)))
    }

    fn limits(&self) -> SheetLimits {
        self.limits
    }

    fn set_screen_echo(&self, enabled: bool) -> HostResult<()> {
        self.ui().echo = enabled;
        Ok(())
    }

    fn set_calculation_mode(&self, mode: CalculationMode) -> HostResult<()> {
        self.ui().calculation = mode;
        Ok(())
    }

    fn select_workbook_sheet(&self, name: &str) -> HostResult<()> {
        let id = self
            .sheet_id(name)
            .map_err(|e| host_error("select_workbook_sheet", e))?;
        self.ui().active_sheet = id;
        Ok(())
    }

    fn select_range(&self, range: &CellRange, active_cell: Option<&CellRange>) -> HostResult<()> {
        let active_cell = active_cell.copied().unwrap_or_else(|| range.first_cell());
        let mut ui = self.ui();
        if range.sheet != ui.active_sheet {
            return Err(ResizerError::host("select_range", "range is not on the active sheet"));
        }
        if !range.contains(active_cell.sheet, active_cell.top_left()) {
            return Err(ResizerError::host("select_range", "active cell outside selection"));
        }
        ui.selections.insert(
            range.sheet,
            Selection {
                range: *range,
                active_cell,
            },
        );
        Ok(())
    }

    fn select_special_current_array(&self) -> HostResult<()> {
        let selection = self.current_selection();
        let active = selection.active_cell;
        let block = self
            .array_block(active.sheet, active.top_left())
            .ok_or_else(|| ResizerError::host("select_special", "no array at the active cell"))?;
        self.ui().selections.insert(
            active.sheet,
            Selection {
                range: block,
                active_cell: active,
            },
        );
        Ok(())
    }

    fn set_cell_value(&self, range: &CellRange, value: CellValue) -> HostResult<()> {
        let grid = self.grid(range.sheet).map_err(|e| host_error("set_cell_value", e))?;
        // Arrays may only be changed as a whole.
        for cell in range.cells() {
            if let Some(block) = grid.get(&cell).and_then(|c| c.array)
                && !(range.contains(block.sheet, block.top_left())
                    && range.contains(block.sheet, CellRef::new(block.col_last, block.row_last)))
            {
                return Err(host_error(
                    "set_cell_value",
                    WorkbookError::PartOfArray(block.to_a1()),
                ));
            }
        }
        for cell in range.cells() {
            if value.is_empty() {
                grid.remove(&cell);
            } else {
                grid.insert(cell, Cell::with_value(value.clone()));
            }
        }
        Ok(())
    }

    fn enter_array_formula(&self, formula_r1c1: &str, range: &CellRange) -> HostResult<()> {
        let grid = self
            .grid(range.sheet)
            .map_err(|e| host_error("enter_array_formula", e))?;
        let limits = self.limits;
        if !limits.contains(range) {
            return Err(ResizerError::host("enter_array_formula", "range is off the sheet"));
        }
        for cell in range.cells() {
            if let Some(block) = grid.get(&cell).and_then(|c| c.array) {
                return Err(ResizerError::host(
                    "enter_array_formula",
                    format!("{} overlaps the array at {}", range.to_a1(), block.to_a1()),
                ));
            }
        }

        let formula = to_a1(formula_r1c1, range.top_left());
        for cell in range.cells() {
            grid.insert(
                cell,
                Cell {
                    formula: Some(formula.clone()),
                    array: Some(*range),
                    value: CellValue::Empty,
                },
            );
        }
        self.mark_dirty(*range);
        Ok(())
    }

    fn show_alert(&self, message: &str) -> HostResult<()> {
        info!("alert: {}", message);
        self.ui().alerts.push(message.to_string());
        Ok(())
    }

    fn enqueue_deferred_macro(&self, job: MacroJob) {
        self.push_macro(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resizer_engine::engine::SheetId;

    fn host() -> MemoryHost {
        MemoryHost::new(&["Sheet1", "My Data"], SheetLimits::default())
    }

    #[test]
    fn test_no_sheet_names_gives_one_default_sheet() {
        let host = MemoryHost::new(&[] as &[&str], SheetLimits::default());
        assert_eq!(host.sheet_id("Sheet1").unwrap(), SheetId(1));
        assert_eq!(host.active_sheet(), SheetId(1));
        assert_eq!(host.selection().unwrap(), CellRange::cell(SheetId(1), 0, 0));
        assert!(host.sheet_id("Sheet2").is_err());
    }

    #[test]
    fn test_reference_text_quotes_sheet_names() {
        let host = host();
        assert_eq!(
            host.reference_text(&CellRange::cell(SheetId(1), 0, 0)).unwrap(),
            "Sheet1!$A$1"
        );
        assert_eq!(
            host.reference_text(&CellRange::new(SheetId(2), 1, 2, 1, 2)).unwrap(),
            "'My Data'!$B$2:$C$3"
        );
    }

    #[test]
    fn test_array_formula_stored_in_a1_for_every_cell() {
        let host = host();
        let block = CellRange::new(SheetId(1), 1, 2, 1, 2);
        host.enter_array_formula("=ECHO(R[-1]C[-1])", &block).unwrap();

        for cell in block.cells() {
            assert_eq!(host.formula(SheetId(1), cell).as_deref(), Some("=ECHO(A1)"));
            assert_eq!(host.array_block(SheetId(1), cell), Some(block));
        }
        let corner = CellRange::cell(SheetId(1), 2, 2);
        assert_eq!(host.cell_formula(&corner).unwrap().as_deref(), Some("=ECHO(A1)"));

        host.set_reference_style(ReferenceStyle::R1C1);
        assert_eq!(
            host.cell_formula(&corner).unwrap().as_deref(),
            Some("=ECHO(R[-1]C[-1])")
        );
    }

    #[test]
    fn test_array_formula_rejects_overlap() {
        let host = host();
        host.enter_array_formula("=ECHO(1)", &CellRange::new(SheetId(1), 2, 3, 0, 0))
            .unwrap();
        let err = host
            .enter_array_formula("=GRID(3, 2)", &CellRange::new(SheetId(1), 0, 2, 0, 1))
            .unwrap_err();
        assert!(err.to_string().contains("overlaps the array at A3:A4"));
    }

    #[test]
    fn test_set_cell_value_refuses_part_of_array() {
        let host = host();
        let block = CellRange::new(SheetId(1), 0, 1, 0, 1);
        host.enter_array_formula("=ECHO(1)", &block).unwrap();

        assert!(host.set_cell_value(&block.first_cell(), CellValue::Empty).is_err());
        host.set_cell_value(&block, CellValue::Empty).unwrap();
        assert!(host.array_block(SheetId(1), CellRef::new(0, 0)).is_none());
    }

    #[test]
    fn test_select_special_current_array() {
        let host = host();
        let block = CellRange::new(SheetId(1), 0, 1, 0, 1);
        host.enter_array_formula("=ECHO(1)", &block).unwrap();

        host.select_range(&block.first_cell(), None).unwrap();
        host.select_special_current_array().unwrap();
        assert_eq!(host.selection().unwrap(), block);
        assert_eq!(host.active_cell().unwrap(), block.first_cell());
    }

    #[test]
    fn test_select_range_must_be_on_active_sheet() {
        let host = host();
        let other = CellRange::cell(SheetId(2), 0, 0);
        assert!(host.select_range(&other, None).is_err());
        host.select_workbook_sheet("My Data").unwrap();
        host.select_range(&other, None).unwrap();
        assert_eq!(host.active_sheet(), SheetId(2));
    }
}
