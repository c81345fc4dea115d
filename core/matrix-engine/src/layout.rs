//! FILENAME: core/matrix-engine/src/layout.rs
//! Header Layout - Merged-cell header grids for both axes.
//!
//! Columns lay groups out horizontally: one header ROW per depth level, with
//! cells spanning leaf columns. Rows lay groups out vertically: one header
//! COLUMN per depth level, with cells spanning leaf rows.
//!
//! Spans are measured in visible leaf slots, so a pruned group takes exactly
//! one column/row. A leaf (true or pruned) that sits above the deepest level
//! stretches over the remaining levels.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use crate::error::MatrixResult;
use crate::traversal::{get_ancestor_chain, leaf_node_ids};
use crate::tree::{NodeId, TaxonomyTree, TreeNode};

// ============================================================================
// HEADER CELL
// ============================================================================

/// A merged header cell, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    /// The node this cell represents, in the tree it was laid out from.
    pub node: NodeId,

    /// Item id of that node.
    pub item_id: String,

    /// Display label.
    pub label: String,

    /// Depth level (header row for columns, header column for rows).
    pub depth: usize,

    /// First leaf column (column headers) or leaf row (row headers) covered.
    pub offset: usize,

    pub colspan: usize,

    pub rowspan: usize,

    /// True for true leaves and pruned groups.
    pub is_leaf: bool,

    pub is_pruned_group: bool,
}

pub type ColumnHeaderCell = HeaderCell;
pub type RowHeaderCell = HeaderCell;

impl HeaderCell {
    fn new(id: NodeId, node: &TreeNode, offset: usize, colspan: usize, rowspan: usize) -> Self {
        HeaderCell {
            node: id,
            item_id: node.item.id.clone(),
            label: node.item.name.clone(),
            depth: node.depth,
            offset,
            colspan,
            rowspan,
            is_leaf: node.is_leaf(),
            is_pruned_group: node.is_pruned_group(),
        }
    }
}

// ============================================================================
// COLUMN HEADERS
// ============================================================================

/// Builds the column header rows, depth 0 on top.
///
/// Produces `max_depth + 1` rows (one row when the taxonomy is flat). An
/// internal node occupies one cell in its depth row spanning all of its
/// visible leaf columns. A leaf occupies one column and spans down to the
/// bottom header row.
///
/// If `max_depth` is smaller than the tree's own depth, the tree's depth wins.
pub fn build_column_header_rows(tree: &TaxonomyTree, max_depth: usize) -> Vec<Vec<ColumnHeaderCell>> {
    let total_rows = max_depth.max(tree.max_depth()) + 1;
    let mut rows: Vec<Vec<ColumnHeaderCell>> = vec![Vec::new(); total_rows];
    let mut next_column = 0;

    for &root in tree.roots() {
        place_column_header(tree, root, total_rows, &mut rows, &mut next_column);
    }

    rows
}

fn place_column_header(
    tree: &TaxonomyTree,
    id: NodeId,
    total_rows: usize,
    rows: &mut [Vec<ColumnHeaderCell>],
    next_column: &mut usize,
) {
    let node = tree.node(id);

    if node.is_leaf() {
        rows[node.depth].push(HeaderCell::new(id, node, *next_column, 1, total_rows - node.depth));
        *next_column += 1;
        return;
    }

    rows[node.depth].push(HeaderCell::new(id, node, *next_column, node.visible_leaf_count, 1));
    for &child in node.children() {
        place_column_header(tree, child, total_rows, rows, next_column);
    }
}

// ============================================================================
// ROW HEADERS
// ============================================================================

/// Builds the row header grid: one row per leaf (in leaf order) and
/// `max_depth + 1` columns.
///
/// Each node's cell appears on the first leaf row it covers; the positions it
/// covers on later rows are `None`. Group cells span their visible leaf rows.
/// Leaf cells span one row and stretch across the remaining depth columns,
/// leaving the deeper positions of that row `None`.
pub fn build_row_header_layout(
    tree: &TaxonomyTree,
    max_depth: usize,
) -> MatrixResult<Vec<Vec<Option<RowHeaderCell>>>> {
    let total_columns = max_depth.max(tree.max_depth()) + 1;
    let leaves = leaf_node_ids(tree);
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut grid = Vec::with_capacity(leaves.len());

    for (row, leaf) in leaves.into_iter().enumerate() {
        let mut cells: Vec<Option<RowHeaderCell>> = vec![None; total_columns];

        for ancestor in get_ancestor_chain(tree, leaf)? {
            if !seen.insert(ancestor) {
                continue;
            }
            let node = tree.node(ancestor);
            let cell = if node.is_leaf() {
                HeaderCell::new(ancestor, node, row, total_columns - node.depth, 1)
            } else {
                HeaderCell::new(ancestor, node, row, 1, node.visible_leaf_count)
            };
            cells[node.depth] = Some(cell);
        }

        grid.push(cells);
    }

    Ok(grid)
}
