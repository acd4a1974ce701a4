use std::sync::Arc;

use log::{debug, warn};
use resizer_core::{
    CalculationMode, Computation, InvocationGuard, Invocation, PendingResizes, Pipeline,
    ResizerConfig, ResultResizer,
};
use resizer_engine::engine::{CellRange, CellRef, CellValue, ErrorValue, SheetId};

use super::formula::{Arg, Expr, parse_formula};
use super::state::MemoryHost;
use crate::error::Result;
use crate::functions::FunctionRegistry;

/// Upper bound on calculate/macro rounds in [`Session::settle`].
const MAX_SETTLE_ROUNDS: usize = 64;

/// Drives a [`MemoryHost`]: the host's recalculation engine and macro loop.
pub struct Session {
    host: Arc<MemoryHost>,
    functions: FunctionRegistry,
    pipeline: Pipeline,
    pending: Arc<PendingResizes>,
}

impl Session {
    pub fn new(host: Arc<MemoryHost>, config: ResizerConfig) -> Self {
        Self::with_functions(host, config, FunctionRegistry::with_builtins())
    }

    pub fn with_functions(
        host: Arc<MemoryHost>,
        config: ResizerConfig,
        functions: FunctionRegistry,
    ) -> Self {
        let pending = Arc::new(PendingResizes::new());
        let resizer = ResultResizer::new(Arc::clone(&host), Arc::clone(&pending), Arc::new(config));
        let pipeline = Pipeline::new().with_hook(InvocationGuard::new(resizer));
        Session {
            host,
            functions,
            pipeline,
            pending,
        }
    }

    pub fn host(&self) -> &Arc<MemoryHost> {
        &self.host
    }

    pub fn pending(&self) -> &Arc<PendingResizes> {
        &self.pending
    }

    /// Enter a formula into `cell`. The text must parse; it is calculated on
    /// the next recalculation.
    pub fn enter_formula(&self, sheet: SheetId, cell: CellRef, text: &str) -> Result<()> {
        let text = text.trim();
        let text = if text.starts_with('=') {
            text.to_string()
        } else {
            format!("={}", text)
        };
        parse_formula(&text)?;
        self.host.enter_formula(sheet, cell, &text)
    }

    /// Put a constant into `cell` and queue every formula for recalculation.
    pub fn set_value(&self, sheet: SheetId, cell: CellRef, value: CellValue) -> Result<()> {
        self.host.enter_value(sheet, cell, value)?;
        self.host.mark_all_dirty();
        Ok(())
    }

    /// Calculate queued formula blocks if calculation is automatic.
    /// Returns how many blocks were calculated.
    pub fn recalculate(&self) -> usize {
        if self.host.calculation_mode() != CalculationMode::Automatic {
            return 0;
        }
        self.calculate_now()
    }

    /// Calculate queued formula blocks regardless of calculation mode.
    pub fn calculate_now(&self) -> usize {
        let blocks = self.host.take_dirty();
        let mut calculated = 0;
        for block in blocks {
            if self.calculate_block(&block) {
                calculated += 1;
            }
        }
        calculated
    }

    /// Run queued macros in order. Macros queued while running are run too.
    pub fn run_pending_macros(&self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.host.pop_macro() {
            job();
            ran += 1;
        }
        ran
    }

    /// Alternate recalculation and macros until neither has work left.
    /// Returns the number of busy rounds.
    pub fn settle(&self) -> usize {
        for round in 0..MAX_SETTLE_ROUNDS {
            let calculated = self.recalculate();
            let ran = self.run_pending_macros();
            if calculated == 0 && ran == 0 {
                return round;
            }
        }
        warn!("workbook still busy after {} rounds", MAX_SETTLE_ROUNDS);
        MAX_SETTLE_ROUNDS
    }

    /// Calculate one formula block. Blocks whose formula was removed or
    /// replaced since they were queued are skipped.
    fn calculate_block(&self, block: &CellRange) -> bool {
        let anchor = block.top_left();
        if self.host.formula_block(block.sheet, anchor) != *block {
            return false;
        }
        let Some(formula) = self.host.formula(block.sheet, anchor) else {
            return false;
        };

        let result = match parse_formula(&formula) {
            Ok(Expr::Call { name, args }) => self.call(block, &name, &args),
            Ok(Expr::Value(arg)) => Computation::Scalar(self.arg_value(block.sheet, &arg)),
            Err(e) => {
                debug!("cannot calculate {}: {}", block, e);
                Computation::Scalar(CellValue::Error(ErrorValue::Value))
            }
        };

        if let Err(e) = self.host.write_result(block, &result) {
            warn!("cannot write result of {}: {}", block, e);
        }
        true
    }

    fn call(&self, block: &CellRange, name: &str, args: &[Arg]) -> Computation {
        let Some(function) = self.functions.get(name) else {
            return Computation::Scalar(CellValue::Error(ErrorValue::Name));
        };
        let values: Vec<CellValue> = args.iter().map(|arg| self.arg_value(block.sheet, arg)).collect();

        self.host.set_caller(Some(*block));
        let result = self
            .pipeline
            .invoke(&Invocation::new(name), || function(&values));
        self.host.set_caller(None);
        result
    }

    fn arg_value(&self, sheet: SheetId, arg: &Arg) -> CellValue {
        match arg {
            Arg::Number(n) => CellValue::Number(*n),
            Arg::Text(s) => CellValue::Text(s.clone()),
            Arg::Bool(b) => CellValue::Bool(*b),
            Arg::Ref(cell) => self.host.value(sheet, *cell),
            Arg::Error(e) => CellValue::Error(*e),
        }
    }
}
