//! FILENAME: core/matrix-engine/src/view.rs
//! Matrix View - Renderable output for the frontend.
//!
//! The view bundles both header grids with one data cell per visible
//! row/column leaf pair. Everything is owned and serializable so it can be
//! handed to the rendering layer as-is.

use serde::{Deserialize, Serialize};
use crate::layout::{ColumnHeaderCell, RowHeaderCell};

// ============================================================================
// CELL TYPES AND VALUES
// ============================================================================

/// The type of a data-area cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixCellType {
    /// Intersection of a row leaf and a column leaf.
    Data,
    /// Total of a row over every column leaf.
    RowTotal,
    /// Total of a column over every row leaf.
    ColumnTotal,
    /// Intersection of the row and column totals.
    GrandTotal,
}

/// Display value for a matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixCellValue {
    Exists(bool),
    Count(usize),
}

impl MatrixCellValue {
    /// Display string for plain-text renderers.
    pub fn formatted(&self) -> String {
        match self {
            MatrixCellValue::Exists(true) => "\u{2713}".to_string(),
            MatrixCellValue::Exists(false) => String::new(),
            MatrixCellValue::Count(0) => String::new(),
            MatrixCellValue::Count(n) => n.to_string(),
        }
    }
}

// ============================================================================
// VIEW CELL
// ============================================================================

/// A single data-area cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixViewCell {
    /// Leaf row index (row count for the column-total row).
    pub row: usize,

    /// Leaf column index (column count for the row-total column).
    pub column: usize,

    pub cell_type: MatrixCellType,

    /// Raw relation count, whatever the display mode.
    pub count: usize,

    pub value: MatrixCellValue,

    /// Item id of the row header node, `None` on the column-total row.
    pub row_item_id: Option<String>,

    /// Item id of the column header node, `None` on the row-total column.
    pub column_item_id: Option<String>,
}

// ============================================================================
// MATRIX VIEW
// ============================================================================

/// The complete rendered matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixView {
    /// Name copied from the definition.
    pub name: Option<String>,

    /// Definition version this view was calculated from.
    pub version: u64,

    /// Number of leaf rows in the data area.
    pub row_count: usize,

    /// Number of leaf columns in the data area.
    pub col_count: usize,

    /// Deepest visible level of the row axis.
    pub row_max_depth: usize,

    /// Deepest visible level of the column axis.
    pub col_max_depth: usize,

    /// Column header rows, depth 0 on top.
    pub column_headers: Vec<Vec<ColumnHeaderCell>>,

    /// Row header grid, one row per leaf row.
    pub row_headers: Vec<Vec<Option<RowHeaderCell>>>,

    /// Data cells, `cells[row][column]`.
    pub cells: Vec<Vec<MatrixViewCell>>,

    /// One total per leaf row; empty when row totals are off.
    #[serde(default)]
    pub row_totals: Vec<MatrixViewCell>,

    /// One total per leaf column; empty when column totals are off.
    #[serde(default)]
    pub column_totals: Vec<MatrixViewCell>,

    /// Present when both row and column totals are on.
    #[serde(default)]
    pub grand_total: Option<MatrixViewCell>,
}

impl MatrixView {
    pub fn cell(&self, row: usize, column: usize) -> Option<&MatrixViewCell> {
        self.cells.get(row).and_then(|r| r.get(column))
    }

    /// Sum of every data cell's relation count.
    pub fn data_count(&self) -> usize {
        self.cells.iter().flatten().map(|c| c.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_values() {
        assert_eq!(MatrixCellValue::Exists(true).formatted(), "\u{2713}");
        assert_eq!(MatrixCellValue::Exists(false).formatted(), "");
        assert_eq!(MatrixCellValue::Count(0).formatted(), "");
        assert_eq!(MatrixCellValue::Count(12).formatted(), "12");
    }
}
