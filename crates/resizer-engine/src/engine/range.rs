//! Rectangular cell ranges.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::CellRef;

/// Opaque identifier of a sheet inside the host workbook.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SheetId(pub u32);

/// A rectangular region on a specific sheet.
///
/// Rows and columns are 0-indexed and inclusive on both ends. Equality and
/// hashing cover all five fields, so two ranges with the same corners on
/// different sheets are distinct.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRange {
    pub sheet: SheetId,
    pub row_first: u32,
    pub row_last: u32,
    pub col_first: u32,
    pub col_last: u32,
}

impl CellRange {
    /// Create a range; corners are normalised so `first <= last`.
    pub fn new(sheet: SheetId, row_first: u32, row_last: u32, col_first: u32, col_last: u32) -> Self {
        CellRange {
            sheet,
            row_first: row_first.min(row_last),
            row_last: row_first.max(row_last),
            col_first: col_first.min(col_last),
            col_last: col_first.max(col_last),
        }
    }

    /// A single-cell range.
    pub fn cell(sheet: SheetId, row: u32, col: u32) -> Self {
        CellRange::new(sheet, row, row, col, col)
    }

    pub fn from_cell_ref(sheet: SheetId, cell: CellRef) -> Self {
        CellRange::cell(sheet, cell.row, cell.col)
    }

    pub fn rows(&self) -> u32 {
        self.row_last - self.row_first + 1
    }

    pub fn columns(&self) -> u32 {
        self.col_last - self.col_first + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_first == self.row_last && self.col_first == self.col_last
    }

    /// The top-left cell of the range.
    pub fn first_cell(&self) -> CellRange {
        CellRange::cell(self.sheet, self.row_first, self.col_first)
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.col_first, self.row_first)
    }

    /// The range sharing this range's first row and column, extended to
    /// `rows` x `columns`. Coordinates saturate at `u32::MAX`; bounds against
    /// the host's sheet size are checked by the caller.
    pub fn resized(&self, rows: u32, columns: u32) -> CellRange {
        CellRange {
            sheet: self.sheet,
            row_first: self.row_first,
            row_last: self.row_first.saturating_add(rows.saturating_sub(1)),
            col_first: self.col_first,
            col_last: self.col_first.saturating_add(columns.saturating_sub(1)),
        }
    }

    pub fn contains(&self, sheet: SheetId, cell: CellRef) -> bool {
        self.sheet == sheet
            && (self.row_first..=self.row_last).contains(&cell.row)
            && (self.col_first..=self.col_last).contains(&cell.col)
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.sheet == other.sheet
            && self.row_first <= other.row_last
            && other.row_first <= self.row_last
            && self.col_first <= other.col_last
            && other.col_first <= self.col_last
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.row_first..=self.row_last)
            .flat_map(move |row| (self.col_first..=self.col_last).map(move |col| CellRef::new(col, row)))
    }

    /// A1 text without a sheet qualifier ("B2" or "B2:D5").
    pub fn to_a1(&self) -> String {
        let first = self.top_left();
        if self.is_single_cell() {
            return first.to_string();
        }
        format!("{}:{}", first, CellRef::new(self.col_last, self.row_last))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.sheet.0, self.to_a1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalises_corners() {
        let range = CellRange::new(SheetId(0), 5, 1, 3, 0);
        assert_eq!((range.row_first, range.row_last), (1, 5));
        assert_eq!((range.col_first, range.col_last), (0, 3));
    }

    #[test]
    fn test_equality_includes_sheet() {
        let a = CellRange::new(SheetId(0), 0, 1, 0, 1);
        let b = CellRange::new(SheetId(1), 0, 1, 0, 1);
        assert_ne!(a, b);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_overlaps() {
        let a = CellRange::new(SheetId(0), 0, 2, 0, 2);
        assert!(a.overlaps(&CellRange::cell(SheetId(0), 2, 2)));
        assert!(!a.overlaps(&CellRange::cell(SheetId(0), 3, 0)));
    }

    #[test]
    fn test_cells_row_major() {
        let range = CellRange::new(SheetId(0), 0, 1, 0, 1);
        let cells: Vec<String> = range.cells().map(|c| c.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_resized_saturates() {
        let range = CellRange::cell(SheetId(0), u32::MAX - 1, 0);
        assert_eq!(range.resized(10, 1).row_last, u32::MAX);
    }
}
