//! Recording host used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use resizer_engine::engine::{CellRange, CellRef, CellValue, SheetId, to_r1c1};

use crate::error::{ResizerError, Result};
use crate::guard::Selection;
use crate::host::{CalculationMode, Host, MacroJob, ReferenceStyle, SheetLimits};

pub(crate) const SHEET: SheetId = SheetId(1);
pub(crate) const OTHER_SHEET: SheetId = SheetId(2);

pub(crate) struct FakeState {
    pub echo: bool,
    pub calculation: CalculationMode,
    pub style: ReferenceStyle,
    pub limits: SheetLimits,
    pub caller: Option<CellRange>,
    pub active_sheet: SheetId,
    pub selections: HashMap<SheetId, Selection>,
    pub formulas: HashMap<(SheetId, CellRef), String>,
    pub values: HashMap<(SheetId, CellRef), CellValue>,
    pub arrays: Vec<CellRange>,
    pub alerts: Vec<String>,
    pub calls: Vec<String>,
    pub macros: VecDeque<MacroJob>,
    pub reject_array_entry: bool,
    pub fail_reference_text: bool,
}

pub(crate) struct FakeHost {
    state: Mutex<FakeState>,
}

impl FakeHost {
    pub fn new() -> Self {
        let mut selections = HashMap::new();
        for sheet in [SHEET, OTHER_SHEET] {
            let home = CellRange::cell(sheet, 0, 0);
            selections.insert(
                sheet,
                Selection {
                    range: home,
                    active_cell: home,
                },
            );
        }
        FakeHost {
            state: Mutex::new(FakeState {
                echo: true,
                calculation: CalculationMode::Automatic,
                style: ReferenceStyle::A1,
                limits: SheetLimits::default(),
                caller: None,
                active_sheet: SHEET,
                selections,
                formulas: HashMap::new(),
                values: HashMap::new(),
                arrays: Vec::new(),
                alerts: Vec::new(),
                calls: Vec::new(),
                macros: VecDeque::new(),
                reject_array_entry: false,
                fail_reference_text: false,
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_formula(&self, cell: &CellRange, formula: &str) {
        self.state()
            .formulas
            .insert((cell.sheet, cell.top_left()), formula.to_string());
    }

    pub fn add_array(&self, block: &CellRange, formula: &str) {
        let mut state = self.state();
        for cell in block.cells() {
            state.formulas.insert((block.sheet, cell), formula.to_string());
        }
        state.arrays.push(*block);
    }

    pub fn value(&self, cell: &CellRange) -> Option<CellValue> {
        self.state().values.get(&(cell.sheet, cell.top_left())).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn queued_macros(&self) -> usize {
        self.state().macros.len()
    }

    /// Run queued macros one at a time without holding the state lock.
    pub fn run_macros(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = self.state().macros.pop_front();
            let Some(job) = job else {
                return ran;
            };
            job();
            ran += 1;
        }
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }
}

impl Host for FakeHost {
    fn caller(&self) -> Option<CellRange> {
        self.state().caller
    }

    fn selection(&self) -> Result<CellRange> {
        let state = self.state();
        Ok(state.selections[&state.active_sheet].range)
    }

    fn active_cell(&self) -> Result<CellRange> {
        let state = self.state();
        Ok(state.selections[&state.active_sheet].active_cell)
    }

    fn cell_formula(&self, cell: &CellRange) -> Result<Option<String>> {
        Ok(self
            .state()
            .formulas
            .get(&(cell.sheet, cell.top_left()))
            .cloned())
    }

    fn is_array_member(&self, cell: &CellRange) -> Result<bool> {
        Ok(self
            .state()
            .arrays
            .iter()
            .any(|block| block.contains(cell.sheet, cell.top_left())))
    }

    fn reference_style(&self) -> Result<ReferenceStyle> {
        Ok(self.state().style)
    }

    fn screen_echo(&self) -> Result<bool> {
        Ok(self.state().echo)
    }

    fn calculation_mode(&self) -> Result<CalculationMode> {
        Ok(self.state().calculation)
    }

    fn sheet_name(&self, range: &CellRange) -> Result<String> {
        Ok(format!("Sheet{}", range.sheet.0))
    }

    fn convert_formula_to_r1c1(&self, formula: &str, anchor: &CellRange) -> Result<String> {
        self.record(format!("convert {}", formula));
        Ok(to_r1c1(formula, anchor.top_left()))
    }

    fn reference_text(&self, range: &CellRange) -> Result<String> {
        if self.state().fail_reference_text {
            return Err(ResizerError::host("reference_text", "unavailable"));
        }
        let first = range.top_left();
        Ok(format!(
            "Sheet{}!${}${}",
            range.sheet.0,
            CellRef::col_to_letters(first.col),
            first.row + 1
        ))
    }

    fn limits(&self) -> SheetLimits {
        self.state().limits
    }

    fn set_screen_echo(&self, enabled: bool) -> Result<()> {
        self.record(format!("echo {}", enabled));
        self.state().echo = enabled;
        Ok(())
    }

    fn set_calculation_mode(&self, mode: CalculationMode) -> Result<()> {
        self.record(format!("calculation {:?}", mode));
        self.state().calculation = mode;
        Ok(())
    }

    fn select_workbook_sheet(&self, name: &str) -> Result<()> {
        self.record(format!("sheet {}", name));
        let id = name
            .strip_prefix("Sheet")
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| ResizerError::host("select_workbook_sheet", name))?;
        self.state().active_sheet = SheetId(id);
        Ok(())
    }

    fn select_range(&self, range: &CellRange, active_cell: Option<&CellRange>) -> Result<()> {
        self.record(format!("select {}", range));
        let mut state = self.state();
        if range.sheet != state.active_sheet {
            return Err(ResizerError::host("select_range", "range is not on the active sheet"));
        }
        let active_cell = active_cell.copied().unwrap_or_else(|| range.first_cell());
        state.selections.insert(
            range.sheet,
            Selection {
                range: *range,
                active_cell,
            },
        );
        Ok(())
    }

    fn select_special_current_array(&self) -> Result<()> {
        self.record("select current array".to_string());
        let mut state = self.state();
        let sheet = state.active_sheet;
        let active = state.selections[&sheet].active_cell;
        let block = state
            .arrays
            .iter()
            .find(|block| block.contains(sheet, active.top_left()))
            .copied()
            .ok_or_else(|| ResizerError::host("select_special", "no array at active cell"))?;
        state.selections.insert(
            sheet,
            Selection {
                range: block,
                active_cell: active,
            },
        );
        Ok(())
    }

    fn set_cell_value(&self, range: &CellRange, value: CellValue) -> Result<()> {
        self.record(format!("set {} {:?}", range, value));
        let mut state = self.state();
        for cell in range.cells() {
            state.formulas.remove(&(range.sheet, cell));
            state.values.insert((range.sheet, cell), value.clone());
        }
        state.arrays.retain(|block| !block.overlaps(range));
        Ok(())
    }

    fn enter_array_formula(&self, formula_r1c1: &str, range: &CellRange) -> Result<()> {
        self.record(format!("array {} {}", range, formula_r1c1));
        let mut state = self.state();
        if state.reject_array_entry || state.arrays.iter().any(|block| block.overlaps(range)) {
            return Err(ResizerError::host("enter_array_formula", "overlaps another array"));
        }
        for cell in range.cells() {
            state.formulas.insert((range.sheet, cell), formula_r1c1.to_string());
        }
        state.arrays.push(*range);
        Ok(())
    }

    fn show_alert(&self, message: &str) -> Result<()> {
        self.record(format!("alert {}", message));
        self.state().alerts.push(message.to_string());
        Ok(())
    }

    fn enqueue_deferred_macro(&self, job: MacroJob) {
        self.state().macros.push_back(job);
    }
}
