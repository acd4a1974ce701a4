//! Worksheet functions available to formulas.

use std::collections::HashMap;
use std::sync::Arc;

use resizer_core::{ComputationResult, Computation};
use resizer_engine::engine::{CellValue, ErrorValue, ValueGrid, format_value};

use crate::error::WorkbookError;

/// A worksheet function: takes evaluated arguments, returns a grid or a value.
pub type WorksheetFn = Arc<dyn Fn(&[CellValue]) -> ComputationResult + Send + Sync>;

/// Side length of the grid returned by `TRYME()`.
const TRY_ME_SIZE: usize = 100;

/// Largest grid `GRID()` will build.
const MAX_GRID_CELLS: usize = 1_000_000;

/// Case-insensitive table of worksheet functions.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, WorksheetFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("TRYME", try_me);
        registry.register("GRID", grid);
        registry.register("ECHO", echo);
        registry.register("FAIL", fail);
        registry.register("PENDING", pending);
        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        f: impl Fn(&[CellValue]) -> ComputationResult + Send + Sync + 'static,
    ) {
        self.functions.insert(name.to_ascii_uppercase(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&WorksheetFn> {
        self.functions.get(&name.to_ascii_uppercase())
    }
}

/// `TRYME()`: a 100 x 100 grid of "row, column" labels.
fn try_me(_args: &[CellValue]) -> ComputationResult {
    Ok(Computation::Grid(ValueGrid::from_fn(
        TRY_ME_SIZE,
        TRY_ME_SIZE,
        |r, c| CellValue::Text(format!("{}, {}", r, c)),
    )))
}

/// `GRID(rows, cols)`: numbers `0..rows*cols` laid out row by row.
fn grid(args: &[CellValue]) -> ComputationResult {
    let rows = count_arg("GRID", args, 0)?;
    let columns = count_arg("GRID", args, 1)?;
    if rows.saturating_mul(columns) > MAX_GRID_CELLS {
        return Err(argument("GRID", format!("grid larger than {} cells", MAX_GRID_CELLS)).into());
    }
    Ok(Computation::Grid(ValueGrid::from_fn(rows, columns, |r, c| {
        CellValue::Number((r * columns + c) as f64)
    })))
}

/// `ECHO(value)`: returns its argument.
fn echo(args: &[CellValue]) -> ComputationResult {
    Ok(Computation::Scalar(args.first().cloned().unwrap_or_default()))
}

/// `FAIL(message)`: raises a failure with the given message.
fn fail(args: &[CellValue]) -> ComputationResult {
    let message = args
        .first()
        .map(format_value)
        .unwrap_or_else(|| "FAIL".to_string());
    Err(WorkbookError::Raised(message).into())
}

/// `PENDING()`: answers "not available", like a source still loading.
fn pending(_args: &[CellValue]) -> ComputationResult {
    Ok(Computation::Scalar(CellValue::Error(ErrorValue::NA)))
}

fn count_arg(function: &'static str, args: &[CellValue], index: usize) -> Result<usize, WorkbookError> {
    match args.get(index) {
        Some(CellValue::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
        Some(other) => Err(argument(
            function,
            format!("argument {} must be a whole number, got {:?}", index + 1, other),
        )),
        None => Err(argument(function, format!("missing argument {}", index + 1))),
    }
}

fn argument(function: &'static str, message: String) -> WorkbookError {
    WorkbookError::Argument { function, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[CellValue]) -> ComputationResult {
        let registry = FunctionRegistry::with_builtins();
        let f = registry.get(name).unwrap();
        f(args)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::with_builtins();
        assert!(registry.get("tryme").is_some());
        assert!(registry.get("NOPE").is_none());
    }

    #[test]
    fn test_try_me_shape_and_labels() {
        let Ok(Computation::Grid(grid)) = call("TRYME", &[]) else {
            panic!("Expected grid");
        };
        assert_eq!((grid.rows(), grid.columns()), (100, 100));
        assert_eq!(grid.get(3, 7), Some(&CellValue::text("3, 7")));
    }

    #[test]
    fn test_grid_numbers() {
        let Ok(Computation::Grid(grid)) = call("GRID", &[3.0.into(), 2.0.into()]) else {
            panic!("Expected grid");
        };
        assert_eq!((grid.rows(), grid.columns()), (3, 2));
        assert_eq!(grid.get(2, 1), Some(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_grid_rejects_bad_arguments() {
        let err = call("GRID", &[CellValue::text("x"), 2.0.into()]).unwrap_err();
        assert!(err.to_string().starts_with("GRID: argument 1"));
        assert!(call("GRID", &[1.5.into(), 2.0.into()]).is_err());
        assert!(call("GRID", &[2.0.into()]).is_err());
    }

    #[test]
    fn test_fail_raises_message() {
        let err = call("FAIL", &[CellValue::text("bad input")]).unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn test_pending_is_not_available() {
        assert!(call("PENDING", &[]).unwrap().is_not_available());
    }
}
