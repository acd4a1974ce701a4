//! Invocation guard: the hook that connects worksheet functions to the
//! resizer.
//!
//! Before a call it checks that the triggering formula exists and is short
//! enough to be re-entered; after a call it hands grid results to the
//! [`ResultResizer`] and passes every result on unchanged, apart from turning
//! a "not available" answer into "error fetching data".

use log::debug;

use resizer_engine::engine::{CellRange, Computation};

use crate::error::{ResizerError, Result};
use crate::host::Host;
use crate::inspect::FormulaInspector;
use crate::pipeline::{ComputationError, Flow, Invocation, InvocationHook};
use crate::resize::ResultResizer;

pub struct InvocationGuard<H: Host> {
    resizer: ResultResizer<H>,
}

impl<H: Host> InvocationGuard<H> {
    pub fn new(resizer: ResultResizer<H>) -> Self {
        InvocationGuard { resizer }
    }

    pub fn resizer(&self) -> &ResultResizer<H> {
        &self.resizer
    }

    /// Range of the formula being calculated, as the host reports it.
    fn caller(&self) -> Option<CellRange> {
        self.resizer.host().caller()
    }

    /// Check the formula that triggered the current call.
    pub fn check(&self) -> Result<()> {
        let caller = self.caller().ok_or(ResizerError::MissingFormula)?;
        let formula = FormulaInspector::new(self.resizer.host().as_ref()).formula_or_empty(&caller);
        if formula.trim().is_empty() {
            return Err(ResizerError::MissingFormula);
        }

        let length = formula.chars().count();
        let max = self.resizer.config().max_formula_length;
        if length > max {
            return Err(ResizerError::FormulaTooLong { length, max });
        }
        Ok(())
    }
}

impl<H: Host> InvocationHook for InvocationGuard<H> {
    fn before(&self, call: &Invocation) -> Flow {
        match self.check() {
            Ok(()) => Flow::Continue,
            Err(ResizerError::FormulaTooLong { length, max }) => {
                debug!("{} not run: formula is {} characters (max {})", call.function, length, max);
                Flow::Return(Computation::message(self.resizer.config().too_long_message()))
            }
            Err(e) => {
                debug!("{} not run: {}", call.function, e);
                Flow::Return(Computation::not_available())
            }
        }
    }

    fn after(&self, call: &Invocation, result: Computation) -> Computation {
        if result.is_not_available() {
            return Computation::getting_data();
        }
        if let (Computation::Grid(grid), Some(caller)) = (&result, self.caller()) {
            let outcome = self.resizer.resize_to_fit(&caller, grid);
            debug!("{} at {}: {:?}", call.function, caller, outcome);
        }
        result
    }

    fn on_failure(&self, call: &Invocation, error: &ComputationError) -> Option<Computation> {
        let error = ResizerError::Computation(error.to_string());
        debug!("{} failed: {}", call.function, error);
        Some(Computation::message(error.to_string()))
    }
}
