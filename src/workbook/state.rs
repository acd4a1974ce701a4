use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use resizer_core::guard::Selection;
use resizer_core::{CalculationMode, Computation, MacroJob, ReferenceStyle, SheetLimits};
use resizer_engine::engine::{CellRange, CellRef, CellValue, SheetId, to_r1c1};

use crate::error::{Result, WorkbookError};

/// A cell in a sheet grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Formula in A1 style. Every cell of an array block holds the block's
    /// formula, written relative to the block's first cell.
    pub formula: Option<String>,
    /// The array block this cell belongs to.
    pub array: Option<CellRange>,
    /// Last calculated or entered value.
    pub value: CellValue,
}

impl Cell {
    pub fn with_value(value: CellValue) -> Cell {
        Cell {
            value,
            ..Cell::default()
        }
    }
}

/// Sparse cell storage for one sheet (DashMap is internally sharded; clones
/// of the `Arc` are cheap).
pub type Grid = Arc<DashMap<CellRef, Cell>>;

pub(super) struct Sheet {
    pub id: SheetId,
    pub name: String,
    pub grid: Grid,
}

pub(super) struct UiState {
    pub active_sheet: SheetId,
    pub selections: HashMap<SheetId, Selection>,
    pub echo: bool,
    pub calculation: CalculationMode,
    pub style: ReferenceStyle,
    pub caller: Option<CellRange>,
    pub alerts: Vec<String>,
    /// Formula blocks waiting to be calculated, oldest first.
    pub dirty: VecDeque<CellRange>,
}

/// Workbook state behind the [`Host`](resizer_core::Host) implementation.
///
/// Locks are only held for the duration of one read or write and never
/// while calling back out, so host calls may be made from inside worksheet
/// functions and deferred macros.
pub struct MemoryHost {
    pub(super) sheets: Vec<Sheet>,
    pub(super) ui: Mutex<UiState>,
    pub(super) macros: Mutex<VecDeque<MacroJob>>,
    pub(super) limits: SheetLimits,
}

impl MemoryHost {
    /// Create a workbook with the given sheet names; the first one is active.
    pub fn new<S: AsRef<str>>(sheet_names: &[S], limits: SheetLimits) -> Self {
        let mut names: Vec<&str> = sheet_names.iter().map(|name| name.as_ref()).collect();
        if names.is_empty() {
            names.push("Sheet1");
        }

        let mut sheets = Vec::new();
        let mut selections = HashMap::new();
        for (index, name) in names.into_iter().enumerate() {
            let id = SheetId(index as u32 + 1);
            let home = CellRange::cell(id, 0, 0);
            selections.insert(
                id,
                Selection {
                    range: home,
                    active_cell: home,
                },
            );
            sheets.push(Sheet {
                id,
                name: name.to_string(),
                grid: Arc::new(DashMap::new()),
            });
        }

        MemoryHost {
            ui: Mutex::new(UiState {
                active_sheet: sheets[0].id,
                selections,
                echo: true,
                calculation: CalculationMode::Automatic,
                style: ReferenceStyle::A1,
                caller: None,
                alerts: Vec::new(),
                dirty: VecDeque::new(),
            }),
            sheets,
            macros: Mutex::new(VecDeque::new()),
            limits,
        }
    }

    pub(super) fn ui(&self) -> MutexGuard<'_, UiState> {
        self.ui.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn macro_queue(&self) -> MutexGuard<'_, VecDeque<MacroJob>> {
        self.macros.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn sheet(&self, id: SheetId) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.id == id)
            .ok_or_else(|| WorkbookError::UnknownSheet(id.0.to_string()))
    }

    pub fn sheet_id(&self, name: &str) -> Result<SheetId> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name.eq_ignore_ascii_case(name))
            .map(|sheet| sheet.id)
            .ok_or_else(|| WorkbookError::UnknownSheet(name.to_string()))
    }

    pub fn grid(&self, sheet: SheetId) -> Result<Grid> {
        Ok(self.sheet(sheet)?.grid.clone())
    }

    pub fn value(&self, sheet: SheetId, cell: CellRef) -> CellValue {
        self.sheet(sheet)
            .ok()
            .and_then(|s| s.grid.get(&cell).map(|c| c.value.clone()))
            .unwrap_or_default()
    }

    /// Stored A1 formula of a cell.
    pub fn formula(&self, sheet: SheetId, cell: CellRef) -> Option<String> {
        self.sheet(sheet)
            .ok()
            .and_then(|s| s.grid.get(&cell).and_then(|c| c.formula.clone()))
    }

    pub fn array_block(&self, sheet: SheetId, cell: CellRef) -> Option<CellRange> {
        self.sheet(sheet)
            .ok()
            .and_then(|s| s.grid.get(&cell).and_then(|c| c.array))
    }

    /// The range a formula at `cell` calculates into: its array block, or
    /// the cell itself.
    pub fn formula_block(&self, sheet: SheetId, cell: CellRef) -> CellRange {
        self.array_block(sheet, cell)
            .unwrap_or_else(|| CellRange::from_cell_ref(sheet, cell))
    }

    /// Formula text as the host displays it, in the current reference style.
    pub fn display_formula(&self, sheet: SheetId, cell: CellRef) -> Option<String> {
        let formula = self.formula(sheet, cell)?;
        match self.ui().style {
            ReferenceStyle::A1 => Some(formula),
            ReferenceStyle::R1C1 => {
                let anchor = self.formula_block(sheet, cell).top_left();
                Some(to_r1c1(&formula, anchor))
            }
        }
    }

    /// Enter a single-cell formula, as a user typing into `cell` would.
    pub fn enter_formula(&self, sheet: SheetId, cell: CellRef, formula: &str) -> Result<()> {
        let grid = self.grid(sheet)?;
        if let Some(block) = grid.get(&cell).and_then(|c| c.array)
            && !block.is_single_cell()
        {
            return Err(WorkbookError::PartOfArray(block.to_a1()));
        }
        grid.insert(
            cell,
            Cell {
                formula: Some(formula.to_string()),
                array: None,
                value: CellValue::Empty,
            },
        );
        self.mark_dirty(CellRange::from_cell_ref(sheet, cell));
        Ok(())
    }

    /// Put a constant into `cell`, as a user typing into it would.
    pub fn enter_value(&self, sheet: SheetId, cell: CellRef, value: CellValue) -> Result<()> {
        let grid = self.grid(sheet)?;
        if let Some(block) = grid.get(&cell).and_then(|c| c.array)
            && !block.is_single_cell()
        {
            return Err(WorkbookError::PartOfArray(block.to_a1()));
        }
        grid.insert(cell, Cell::with_value(value));
        Ok(())
    }

    pub fn reference_style(&self) -> ReferenceStyle {
        self.ui().style
    }

    pub fn set_reference_style(&self, style: ReferenceStyle) {
        self.ui().style = style;
    }

    pub fn screen_echo(&self) -> bool {
        self.ui().echo
    }

    pub fn calculation_mode(&self) -> CalculationMode {
        self.ui().calculation
    }

    pub fn active_sheet(&self) -> SheetId {
        self.ui().active_sheet
    }

    pub fn current_selection(&self) -> Selection {
        let ui = self.ui();
        ui.selections[&ui.active_sheet]
    }

    pub fn alerts(&self) -> Vec<String> {
        self.ui().alerts.clone()
    }

    pub(super) fn set_caller(&self, caller: Option<CellRange>) {
        self.ui().caller = caller;
    }

    pub(super) fn mark_dirty(&self, block: CellRange) {
        let mut ui = self.ui();
        if !ui.dirty.contains(&block) {
            ui.dirty.push_back(block);
        }
    }

    /// Queue every formula block in the workbook for calculation.
    pub fn mark_all_dirty(&self) {
        for sheet in &self.sheets {
            let anchors: Vec<CellRange> = sheet
                .grid
                .iter()
                .filter(|entry| entry.value().formula.is_some())
                .filter_map(|entry| match entry.value().array {
                    Some(block) if block.top_left() == *entry.key() => Some(block),
                    Some(_) => None,
                    None => Some(CellRange::from_cell_ref(sheet.id, *entry.key())),
                })
                .collect();
            for block in anchors {
                self.mark_dirty(block);
            }
        }
    }

    pub(super) fn take_dirty(&self) -> Vec<CellRange> {
        self.ui().dirty.drain(..).collect()
    }

    pub fn has_dirty(&self) -> bool {
        !self.ui().dirty.is_empty()
    }

    /// Write a function result over `block`.
    pub(super) fn write_result(&self, block: &CellRange, result: &Computation) -> Result<()> {
        let grid = self.grid(block.sheet)?;
        for cell in block.cells() {
            let value = result.value_at(
                (cell.row - block.row_first) as usize,
                (cell.col - block.col_first) as usize,
            );
            if let Some(mut entry) = grid.get_mut(&cell) {
                entry.value = value;
            }
        }
        Ok(())
    }

    pub(super) fn push_macro(&self, job: MacroJob) {
        self.macro_queue().push_back(job);
    }

    pub(super) fn pop_macro(&self) -> Option<MacroJob> {
        self.macro_queue().pop_front()
    }

    pub fn pending_macros(&self) -> usize {
        self.macro_queue().len()
    }

    /// Bounding box of non-empty cells on a sheet.
    pub fn used_range(&self, sheet: SheetId) -> Option<CellRange> {
        let grid = self.grid(sheet).ok()?;
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for entry in grid.iter() {
            if entry.value().value.is_empty() && entry.value().formula.is_none() {
                continue;
            }
            let cell = *entry.key();
            bounds = Some(match bounds {
                None => (cell.row, cell.row, cell.col, cell.col),
                Some((r0, r1, c0, c1)) => {
                    (r0.min(cell.row), r1.max(cell.row), c0.min(cell.col), c1.max(cell.col))
                }
            });
        }
        bounds.map(|(r0, r1, c0, c1)| CellRange::new(sheet, r0, r1, c0, c1))
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(&["Sheet1"], SheetLimits::default())
    }
}
