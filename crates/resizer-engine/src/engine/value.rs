//! Values produced by worksheet functions.

use serde::{Deserialize, Serialize};

/// Worksheet error values.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ErrorValue {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    /// "Data not available"; hosts show it while a result is still loading.
    NA,
    /// The computation ran but produced no data.
    GettingData,
}

impl ErrorValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorValue::Null => "#NULL!",
            ErrorValue::Div0 => "#DIV/0!",
            ErrorValue::Value => "#VALUE!",
            ErrorValue::Ref => "#REF!",
            ErrorValue::Name => "#NAME?",
            ErrorValue::Num => "#NUM!",
            ErrorValue::NA => "#N/A",
            ErrorValue::GettingData => "#GETTING_DATA",
        }
    }
}

/// A single cell value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(ErrorValue),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<ErrorValue> for CellValue {
    fn from(e: ErrorValue) -> Self {
        CellValue::Error(e)
    }
}

/// A two-dimensional, row-major grid of values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueGrid {
    rows: usize,
    columns: usize,
    values: Vec<CellValue>,
}

impl ValueGrid {
    pub fn new(rows: usize, columns: usize) -> Self {
        ValueGrid {
            rows,
            columns,
            values: vec![CellValue::Empty; rows * columns],
        }
    }

    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> CellValue) -> Self {
        let mut values = Vec::with_capacity(rows * columns);
        for r in 0..rows {
            for c in 0..columns {
                values.push(f(r, c));
            }
        }
        ValueGrid { rows, columns, values }
    }

    /// Build a grid from rows; short rows are padded with `Empty`.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let row_count = if columns == 0 { 0 } else { rows.len() };
        let mut values = Vec::with_capacity(row_count * columns);
        for mut row in rows.into_iter().take(row_count) {
            row.resize(columns, CellValue::Empty);
            values.extend(row);
        }
        ValueGrid {
            rows: row_count,
            columns,
            values,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        if row >= self.rows || col >= self.columns {
            return None;
        }
        self.values.get(row * self.columns + col)
    }
}

/// The value a worksheet function hands back to the host: either a grid or a
/// single value (which includes messages and error sentinels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Computation {
    Grid(ValueGrid),
    Scalar(CellValue),
}

impl Computation {
    /// "Data not available" sentinel.
    pub fn not_available() -> Self {
        Computation::Scalar(CellValue::Error(ErrorValue::NA))
    }

    /// "Error fetching data" sentinel.
    pub fn getting_data() -> Self {
        Computation::Scalar(CellValue::Error(ErrorValue::GettingData))
    }

    pub fn message(text: impl Into<String>) -> Self {
        Computation::Scalar(CellValue::Text(text.into()))
    }

    pub fn is_not_available(&self) -> bool {
        matches!(self, Computation::Scalar(CellValue::Error(ErrorValue::NA)))
    }

    /// Value shown at `(row, col)` of the block displaying this result.
    /// Positions outside a grid show `#N/A`; a scalar fills every position.
    pub fn value_at(&self, row: usize, col: usize) -> CellValue {
        match self {
            Computation::Scalar(v) => v.clone(),
            Computation::Grid(grid) => grid
                .get(row, col)
                .cloned()
                .unwrap_or(CellValue::Error(ErrorValue::NA)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_pads_short_rows() {
        let grid = ValueGrid::from_rows(vec![
            vec![1.0.into(), 2.0.into()],
            vec![3.0.into()],
        ]);
        assert_eq!((grid.rows(), grid.columns()), (2, 2));
        assert_eq!(grid.get(1, 1), Some(&CellValue::Empty));
    }

    #[test]
    fn test_from_rows_without_columns_is_empty() {
        let grid = ValueGrid::from_rows(vec![vec![], vec![]]);
        assert!(grid.is_empty());
        assert_eq!(grid.rows(), 0);
    }

    #[test]
    fn test_value_at_outside_grid_is_na() {
        let result = Computation::Grid(ValueGrid::from_fn(1, 1, |_, _| 7.0.into()));
        assert_eq!(result.value_at(0, 0), CellValue::Number(7.0));
        assert_eq!(result.value_at(0, 1), CellValue::Error(ErrorValue::NA));
    }

    #[test]
    fn test_sentinels() {
        assert!(Computation::not_available().is_not_available());
        assert!(!Computation::getting_data().is_not_available());
    }
}
