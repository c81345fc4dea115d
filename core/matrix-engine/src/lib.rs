//! FILENAME: core/matrix-engine/src/lib.rs
//! Hierarchical cross-tabulation (matrix) engine.
//!
//! Turns two independent, arbitrarily deep taxonomies plus a flat list of
//! pairwise relationships into a pivot-like grid with merged multi-level
//! headers, depth-limited drill, and aggregated cell counts. Every function
//! is pure: inputs are never mutated and nothing is retained between calls.
//!
//! Layers:
//! - `definition`: Serializable configuration and input records (what the matrix IS)
//! - `tree`: Arena-backed forest built from a flat item list
//! - `prune`: Depth-limited views of a built tree
//! - `traversal`: Leaf order, ancestor chains, id lookup
//! - `layout`: Merged header grids for both axes
//! - `aggregate`: Relation counts for any pair of row/column groups
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `engine`: Calculation engine (HOW we calculate)

pub mod definition;
pub mod error;
pub mod tree;
pub mod prune;
pub mod traversal;
pub mod layout;
pub mod aggregate;
pub mod view;
pub mod engine;

pub use definition::*;
pub use error::{MatrixError, MatrixResult};
pub use tree::{build_tree, NodeId, NodeKind, TaxonomyTree, TreeNode};
pub use prune::{prune_to, prune_tree_to_depth};
pub use traversal::{
    build_all_nodes_map, get_ancestor_chain, get_leaf_nodes, get_leaf_order, AncestorChain,
};
pub use layout::{
    build_column_header_rows, build_row_header_layout, ColumnHeaderCell, HeaderCell, RowHeaderCell,
};
pub use aggregate::{
    aggregate_count, build_intersection_map, drill_down, get_effective_leaf_ids,
    intersection_key, IntersectionMap, RelationCount,
};
pub use view::*;
pub use engine::{calculate_matrix, drill_down_cell, MatrixAxis, MatrixCalculator};
