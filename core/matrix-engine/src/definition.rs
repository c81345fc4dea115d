//! FILENAME: core/matrix-engine/src/definition.rs
//! Matrix Definition - The serializable configuration and input records.
//!
//! This module contains the types needed to DESCRIBE a matrix report:
//! - The taxonomy items of each axis, as delivered by the upstream data source
//! - The relationship records correlating row items to column items
//! - The user's drill settings and display options
//!
//! Everything here is a plain value: serializable, cheap to clone, and
//! never mutated by the engine.

use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT RECORDS
// ============================================================================

/// One node of a hierarchy, as delivered by the upstream data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyItem {
    /// Opaque unique identifier, stable across calls.
    pub id: String,

    /// Display label. Also the sort key among siblings.
    pub name: String,

    /// Identifier of the parent item, or `None` for a top-level item.
    /// May reference an id that is not part of the list.
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl TaxonomyItem {
    /// Creates a top-level item.
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        TaxonomyItem {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Creates an item nested under `parent_id`.
    pub fn child(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        TaxonomyItem {
            id: id.into(),
            name: name.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

/// One observed relation between a row-axis item and a column-axis item.
/// The same pair may occur several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Id of the row-axis item.
    pub row_id: String,

    /// Id of the column-axis item.
    pub column_id: String,

    /// Optional identifier of the relation itself (for drill-through).
    #[serde(default)]
    pub id: Option<String>,
}

impl RelationRecord {
    pub fn new(row_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        RelationRecord {
            row_id: row_id.into(),
            column_id: column_id.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// ============================================================================
// DRILL SETTINGS
// ============================================================================

/// How many hierarchy levels of an axis are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VisibleDepth {
    /// Show every level (no pruning).
    #[default]
    All,
    /// Show levels `0..n`; nodes at depth `n` and below collapse into
    /// virtual leaves. `Limited(0)` collapses each root into one leaf.
    Limited(usize),
}

impl VisibleDepth {
    /// Returns the depth limit, or `None` when every level is shown.
    pub fn limit(self) -> Option<usize> {
        match self {
            VisibleDepth::All => None,
            VisibleDepth::Limited(depth) => Some(depth),
        }
    }
}

impl From<Option<usize>> for VisibleDepth {
    fn from(value: Option<usize>) -> Self {
        match value {
            Some(depth) => VisibleDepth::Limited(depth),
            None => VisibleDepth::All,
        }
    }
}

// ============================================================================
// DISPLAY OPTIONS
// ============================================================================

/// What a data cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CellDisplayMode {
    /// Whether at least one relation exists.
    Exists,
    /// The number of relations (multiplicity counts).
    #[default]
    Count,
}

/// Controls which summary rows/columns are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixLayout {
    /// Add a total per row, summed over every column leaf.
    #[serde(default)]
    pub show_row_totals: bool,

    /// Add a total per column, summed over every row leaf.
    #[serde(default)]
    pub show_column_totals: bool,
}

impl Default for MatrixLayout {
    fn default() -> Self {
        MatrixLayout {
            show_row_totals: false,
            show_column_totals: false,
        }
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete, serializable definition of a matrix report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDefinition {
    /// User-friendly name for this report.
    #[serde(default)]
    pub name: Option<String>,

    /// Visible depth of the row axis.
    #[serde(default)]
    pub row_depth: VisibleDepth,

    /// Visible depth of the column axis.
    #[serde(default)]
    pub column_depth: VisibleDepth,

    /// Existence or count display.
    #[serde(default)]
    pub display_mode: CellDisplayMode,

    /// Totals and other layout options.
    #[serde(default)]
    pub layout: MatrixLayout,

    /// Version for cache invalidation by the host.
    #[serde(default)]
    pub version: u64,
}

impl Default for MatrixDefinition {
    fn default() -> Self {
        MatrixDefinition::new()
    }
}

impl MatrixDefinition {
    /// Creates a definition showing every level of both axes as counts.
    pub fn new() -> Self {
        MatrixDefinition {
            name: None,
            row_depth: VisibleDepth::All,
            column_depth: VisibleDepth::All,
            display_mode: CellDisplayMode::Count,
            layout: MatrixLayout::default(),
            version: 0,
        }
    }

    /// Increments the version (for cache invalidation).
    pub fn bump_version(&mut self) {
        self.version += 1;
    }
}
