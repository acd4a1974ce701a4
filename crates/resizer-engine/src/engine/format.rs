//! Display formatting for cell values.

use super::value::{CellValue, ErrorValue};

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() || n.is_infinite() {
        ErrorValue::Num.as_str().to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Format a cell value the way a grid displays it.
pub fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.clone(),
        CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        CellValue::Error(e) => e.as_str().to_string(),
    }
}
