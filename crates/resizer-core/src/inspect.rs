//! Reading formulas back from the host.

use resizer_engine::engine::CellRange;

use crate::error::{ResizerError, Result};
use crate::host::{Host, ReferenceStyle};

/// Formula text read from a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaText {
    pub text: String,
    /// Part of a legacy array formula.
    pub is_array: bool,
    /// References are written in R1C1 style.
    pub r1c1: bool,
}

pub struct FormulaInspector<'h, H: Host + ?Sized> {
    host: &'h H,
}

impl<'h, H: Host + ?Sized> FormulaInspector<'h, H> {
    pub fn new(host: &'h H) -> Self {
        FormulaInspector { host }
    }

    /// Read the formula of `cell` (the first cell of a range).
    /// Fails with [`ResizerError::MissingFormula`] for blank or non-formula cells.
    pub fn read_formula(&self, cell: &CellRange) -> Result<FormulaText> {
        let cell = cell.first_cell();
        let text = self
            .host
            .cell_formula(&cell)?
            .filter(|text| !text.trim().is_empty())
            .ok_or(ResizerError::MissingFormula)?;
        Ok(FormulaText {
            text,
            is_array: self.is_part_of_array_formula(&cell)?,
            r1c1: self.host.reference_style()? == ReferenceStyle::R1C1,
        })
    }

    /// Formula text of `cell`, or an empty string when it cannot be read.
    pub fn formula_or_empty(&self, cell: &CellRange) -> String {
        self.host
            .cell_formula(&cell.first_cell())
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    pub fn is_part_of_array_formula(&self, cell: &CellRange) -> Result<bool> {
        self.host.is_array_member(&cell.first_cell())
    }

    /// Normalise `formula` to R1C1 references relative to `anchor`.
    /// Formulas already in R1C1 style are returned unchanged.
    pub fn to_r1c1_style(&self, formula: &FormulaText, anchor: &CellRange) -> Result<FormulaText> {
        if formula.r1c1 {
            return Ok(formula.clone());
        }
        let text = self
            .host
            .convert_formula_to_r1c1(&formula.text, &anchor.first_cell())?;
        Ok(FormulaText {
            text,
            r1c1: true,
            ..formula.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, SHEET};

    #[test]
    fn test_read_formula_reports_array_membership() {
        let host = FakeHost::new();
        let block = CellRange::new(SHEET, 0, 2, 0, 1);
        host.add_array(&block, "=GRID(3, 2)");

        let formula = FormulaInspector::new(&host).read_formula(&block).unwrap();
        assert_eq!(formula.text, "=GRID(3, 2)");
        assert!(formula.is_array);
        assert!(!formula.r1c1);
    }

    #[test]
    fn test_read_formula_missing() {
        let host = FakeHost::new();
        let cell = CellRange::cell(SHEET, 4, 4);
        let inspector = FormulaInspector::new(&host);
        assert_eq!(inspector.read_formula(&cell), Err(ResizerError::MissingFormula));
        assert_eq!(inspector.formula_or_empty(&cell), "");

        host.set_formula(&cell, "   ");
        assert_eq!(inspector.read_formula(&cell), Err(ResizerError::MissingFormula));
    }

    #[test]
    fn test_to_r1c1_style_converts_a1_formulas() {
        let host = FakeHost::new();
        let cell = CellRange::cell(SHEET, 1, 1);
        host.set_formula(&cell, "=ECHO(A1)");

        let inspector = FormulaInspector::new(&host);
        let formula = inspector.read_formula(&cell).unwrap();
        let converted = inspector.to_r1c1_style(&formula, &cell).unwrap();
        assert_eq!(converted.text, "=ECHO(R[-1]C[-1])");
        assert!(converted.r1c1);
    }

    #[test]
    fn test_to_r1c1_style_is_identity_in_r1c1_mode() {
        let host = FakeHost::new();
        host.state().style = ReferenceStyle::R1C1;
        let cell = CellRange::cell(SHEET, 1, 1);
        host.set_formula(&cell, "=ECHO(R[-1]C[-1])");

        let inspector = FormulaInspector::new(&host);
        let formula = inspector.read_formula(&cell).unwrap();
        let converted = inspector.to_r1c1_style(&formula, &cell).unwrap();
        assert_eq!(converted, formula);
        assert!(host.calls().iter().all(|call| !call.starts_with("convert")));
    }
}
