//! FILENAME: core/matrix-engine/src/engine.rs
//! Matrix Engine - The calculation core that transforms taxonomies into a view.
//!
//! This module takes a MatrixDefinition (configuration), the item lists of
//! both axes, and an intersection map, and produces a MatrixView (2D grid
//! ready for rendering).
//!
//! Algorithm:
//! 1. Build one tree per axis and prune it to the requested visible depth
//! 2. Lay out the column header rows and the row header grid
//! 3. Cross-tabulate: for each (row leaf, column leaf) pair, aggregate the
//!    relations between both effective leaf sets
//! 4. Add row, column and grand totals if configured

use crate::aggregate::{
    aggregate_count, cell_value, drill_down, get_effective_leaf_ids, IntersectionMap,
    RelationCount,
};
use crate::definition::{MatrixDefinition, TaxonomyItem, VisibleDepth};
use crate::error::{MatrixError, MatrixResult};
use crate::layout::{build_column_header_rows, build_row_header_layout};
use crate::prune::prune_to;
use crate::traversal::{get_leaf_nodes, get_leaf_order};
use crate::tree::{build_tree, TaxonomyTree, TreeNode};
use crate::view::{MatrixCellType, MatrixView, MatrixViewCell};

// ============================================================================
// AXIS
// ============================================================================

/// One axis of the matrix: the full tree and the depth-limited view shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixAxis {
    /// The un-pruned tree.
    pub tree: TaxonomyTree,

    /// The tree as displayed (equal to `tree` for `VisibleDepth::All`).
    pub visible: TaxonomyTree,

    /// The depth setting `visible` was derived with.
    pub depth: VisibleDepth,
}

impl MatrixAxis {
    /// Builds the tree for `items` and prunes it to `depth`.
    pub fn build(items: &[TaxonomyItem], depth: VisibleDepth) -> MatrixResult<Self> {
        let tree = build_tree(items)?;
        let visible = prune_to(&tree, depth);
        Ok(MatrixAxis { tree, visible, depth })
    }

    /// Re-derives the visible tree for another depth, reusing the built tree.
    pub fn with_depth(&self, depth: VisibleDepth) -> Self {
        MatrixAxis {
            tree: self.tree.clone(),
            visible: prune_to(&self.tree, depth),
            depth,
        }
    }

    /// Visible leaf ids in display order.
    pub fn leaf_order(&self) -> Vec<&str> {
        get_leaf_order(&self.visible)
    }

    /// Number of header levels minus one.
    pub fn header_depth(&self) -> usize {
        self.visible.max_depth()
    }

    /// Effective leaf ids of a displayed header node.
    pub fn effective_leaf_ids(&self, item_id: &str) -> MatrixResult<&[String]> {
        self.visible
            .find_node(item_id)
            .map(get_effective_leaf_ids)
            .ok_or_else(|| MatrixError::NodeNotFound(item_id.to_string()))
    }
}

// ============================================================================
// MATRIX CALCULATOR
// ============================================================================

/// The main calculation engine for matrix reports.
pub struct MatrixCalculator<'a, V> {
    definition: &'a MatrixDefinition,
    rows: &'a MatrixAxis,
    columns: &'a MatrixAxis,
    intersections: &'a IntersectionMap<V>,
}

impl<'a, V: RelationCount> MatrixCalculator<'a, V> {
    /// Creates a new calculator instance.
    pub fn new(
        definition: &'a MatrixDefinition,
        rows: &'a MatrixAxis,
        columns: &'a MatrixAxis,
        intersections: &'a IntersectionMap<V>,
    ) -> Self {
        MatrixCalculator {
            definition,
            rows,
            columns,
            intersections,
        }
    }

    /// Executes the full calculation and returns the rendered view.
    pub fn calculate(&self) -> MatrixResult<MatrixView> {
        // Step 1: Header layouts
        let column_headers =
            build_column_header_rows(&self.columns.visible, self.columns.header_depth());
        let row_headers = build_row_header_layout(&self.rows.visible, self.rows.header_depth())?;

        // Step 2: Leaf nodes in display order
        let row_leaves = get_leaf_nodes(&self.rows.visible);
        let col_leaves = get_leaf_nodes(&self.columns.visible);

        // Step 3: Cross-tabulate
        let cells: Vec<Vec<MatrixViewCell>> = row_leaves
            .iter()
            .enumerate()
            .map(|(row, row_node)| {
                let row_ids = get_effective_leaf_ids(row_node);
                col_leaves
                    .iter()
                    .enumerate()
                    .map(|(column, col_node)| {
                        let count = aggregate_count(
                            row_ids,
                            get_effective_leaf_ids(col_node),
                            self.intersections,
                        );
                        self.make_cell(row, column, MatrixCellType::Data, count, Some(*row_node), Some(*col_node))
                    })
                    .collect()
            })
            .collect();

        // Step 4: Totals
        let (row_totals, column_totals, grand_total) = self.generate_totals(&row_leaves, &col_leaves);

        let view = MatrixView {
            name: self.definition.name.clone(),
            version: self.definition.version,
            row_count: row_leaves.len(),
            col_count: col_leaves.len(),
            row_max_depth: self.rows.header_depth(),
            col_max_depth: self.columns.header_depth(),
            column_headers,
            row_headers,
            cells,
            row_totals,
            column_totals,
            grand_total,
        };

        log::debug!(
            "calculated matrix rows={} cols={} relations={}",
            view.row_count,
            view.col_count,
            view.data_count()
        );

        Ok(view)
    }

    /// Totals are aggregated over the full true-leaf sets, so they do not
    /// depend on the drill depth of the opposite axis.
    fn generate_totals(
        &self,
        row_leaves: &[&TreeNode],
        col_leaves: &[&TreeNode],
    ) -> (Vec<MatrixViewCell>, Vec<MatrixViewCell>, Option<MatrixViewCell>) {
        let layout = &self.definition.layout;
        let all_row_ids = self.rows.tree.all_leaf_ids();
        let all_col_ids = self.columns.tree.all_leaf_ids();

        let row_totals = if layout.show_row_totals {
            row_leaves
                .iter()
                .enumerate()
                .map(|(row, node)| {
                    let count = aggregate_count(
                        get_effective_leaf_ids(node),
                        all_col_ids.as_slice(),
                        self.intersections,
                    );
                    self.make_cell(row, col_leaves.len(), MatrixCellType::RowTotal, count, Some(*node), None)
                })
                .collect()
        } else {
            Vec::new()
        };

        let column_totals = if layout.show_column_totals {
            col_leaves
                .iter()
                .enumerate()
                .map(|(column, node)| {
                    let count = aggregate_count(
                        all_row_ids.as_slice(),
                        get_effective_leaf_ids(node),
                        self.intersections,
                    );
                    self.make_cell(row_leaves.len(), column, MatrixCellType::ColumnTotal, count, None, Some(*node))
                })
                .collect()
        } else {
            Vec::new()
        };

        let grand_total = if layout.show_row_totals && layout.show_column_totals {
            let count = aggregate_count(all_row_ids.as_slice(), all_col_ids.as_slice(), self.intersections);
            Some(self.make_cell(
                row_leaves.len(),
                col_leaves.len(),
                MatrixCellType::GrandTotal,
                count,
                None,
                None,
            ))
        } else {
            None
        };

        (row_totals, column_totals, grand_total)
    }

    fn make_cell(
        &self,
        row: usize,
        column: usize,
        cell_type: MatrixCellType,
        count: usize,
        row_node: Option<&TreeNode>,
        col_node: Option<&TreeNode>,
    ) -> MatrixViewCell {
        MatrixViewCell {
            row,
            column,
            cell_type,
            count,
            value: cell_value(count, self.definition.display_mode),
            row_item_id: row_node.map(|n| n.item.id.clone()),
            column_item_id: col_node.map(|n| n.item.id.clone()),
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Main entry point: builds both axes and calculates the matrix view.
pub fn calculate_matrix<V: RelationCount>(
    definition: &MatrixDefinition,
    row_items: &[TaxonomyItem],
    column_items: &[TaxonomyItem],
    intersections: &IntersectionMap<V>,
) -> MatrixResult<MatrixView> {
    let rows = MatrixAxis::build(row_items, definition.row_depth)?;
    let columns = MatrixAxis::build(column_items, definition.column_depth)?;
    MatrixCalculator::new(definition, &rows, &columns, intersections).calculate()
}

/// Returns the relation instances behind the cell at the given row and
/// column header ids.
pub fn drill_down_cell<'m, T>(
    rows: &MatrixAxis,
    columns: &MatrixAxis,
    row_item_id: &str,
    column_item_id: &str,
    intersections: &'m IntersectionMap<Vec<T>>,
) -> MatrixResult<Vec<&'m T>> {
    let row_ids = rows.effective_leaf_ids(row_item_id)?;
    let col_ids = columns.effective_leaf_ids(column_item_id)?;
    Ok(drill_down(row_ids, col_ids, intersections))
}
