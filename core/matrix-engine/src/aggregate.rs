//! FILENAME: core/matrix-engine/src/aggregate.rs
//! Aggregator - Cell values for any pair of row and column groups.
//!
//! Relations are looked up in an intersection map keyed by the literal
//! string `"{row_id}:{col_id}"`. A header cell stands for its effective leaf
//! ids, so a single matrix cell can combine the relations of whole groups.

use rustc_hash::FxHashMap;
use crate::definition::{CellDisplayMode, RelationRecord};
use crate::tree::{NodeKind, TreeNode};
use crate::view::MatrixCellValue;

/// `"{row_id}:{col_id}"` -> relation instances (or a pre-computed count).
pub type IntersectionMap<V> = FxHashMap<String, V>;

/// A value stored in an intersection map that knows how many relations it
/// stands for.
pub trait RelationCount {
    fn relation_count(&self) -> usize;
}

impl<T> RelationCount for Vec<T> {
    fn relation_count(&self) -> usize {
        self.len()
    }
}

impl RelationCount for usize {
    fn relation_count(&self) -> usize {
        *self
    }
}

impl RelationCount for u32 {
    fn relation_count(&self) -> usize {
        *self as usize
    }
}

/// Builds the intersection map key for a row/column leaf pair.
pub fn intersection_key(row_id: &str, col_id: &str) -> String {
    format!("{}:{}", row_id, col_id)
}

/// Groups relation records by their row/column pair.
pub fn build_intersection_map(records: &[RelationRecord]) -> IntersectionMap<Vec<&RelationRecord>> {
    let mut map: IntersectionMap<Vec<&RelationRecord>> = FxHashMap::default();
    for record in records {
        map.entry(intersection_key(&record.row_id, &record.column_id))
            .or_default()
            .push(record);
    }
    map
}

/// Sums the relation counts of every `(row, col)` pair drawn from the two
/// id lists. Missing pairs count as zero.
pub fn aggregate_count<R, C, V>(
    row_leaf_ids: &[R],
    col_leaf_ids: &[C],
    intersections: &IntersectionMap<V>,
) -> usize
where
    R: AsRef<str>,
    C: AsRef<str>,
    V: RelationCount,
{
    if intersections.is_empty() {
        return 0;
    }

    let mut key = String::new();
    let mut total = 0;
    for row_id in row_leaf_ids {
        for col_id in col_leaf_ids {
            fill_key(&mut key, row_id.as_ref(), col_id.as_ref());
            if let Some(value) = intersections.get(&key) {
                total += value.relation_count();
            }
        }
    }
    total
}

/// The relation instances behind a cell, in row-then-column leaf order.
pub fn drill_down<'m, R, C, T>(
    row_leaf_ids: &[R],
    col_leaf_ids: &[C],
    intersections: &'m IntersectionMap<Vec<T>>,
) -> Vec<&'m T>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    let mut key = String::new();
    let mut found = Vec::new();
    for row_id in row_leaf_ids {
        for col_id in col_leaf_ids {
            fill_key(&mut key, row_id.as_ref(), col_id.as_ref());
            if let Some(relations) = intersections.get(&key) {
                found.extend(relations.iter());
            }
        }
    }
    found
}

/// The true-leaf ids a header node stands for: its own id for a true leaf,
/// its full leaf descendant list for groups and pruned groups.
pub fn get_effective_leaf_ids(node: &TreeNode) -> &[String] {
    match node.kind {
        NodeKind::Leaf => std::slice::from_ref(&node.item.id),
        NodeKind::Group { .. } | NodeKind::PrunedGroup => node.leaf_descendants.as_slice(),
    }
}

/// Turns a relation count into the value shown for the given mode.
pub fn cell_value(count: usize, mode: CellDisplayMode) -> MatrixCellValue {
    match mode {
        CellDisplayMode::Exists => MatrixCellValue::Exists(count > 0),
        CellDisplayMode::Count => MatrixCellValue::Count(count),
    }
}

/// Reuses one buffer for the many key lookups of an aggregation.
fn fill_key(key: &mut String, row_id: &str, col_id: &str) {
    key.clear();
    key.push_str(row_id);
    key.push(':');
    key.push_str(col_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TaxonomyItem;
    use crate::prune::prune_tree_to_depth;
    use crate::tree::build_tree;

    fn create_test_map() -> IntersectionMap<Vec<&'static str>> {
        let mut map = IntersectionMap::default();
        map.insert("r1:c1".to_string(), vec!["x", "y"]);
        map.insert("r1:c2".to_string(), vec!["z"]);
        map.insert("r2:c1".to_string(), vec!["w"]);
        map
    }

    #[test]
    fn test_aggregate_count_sums_pairs() {
        let map = create_test_map();
        assert_eq!(aggregate_count(&["r1"], &["c1", "c2"], &map), 3);
    }

    #[test]
    fn test_aggregate_count_missing_is_zero() {
        let map = create_test_map();
        assert_eq!(aggregate_count(&["r3"], &["c1"], &map), 0);
        assert_eq!(aggregate_count::<&str, &str, Vec<&str>>(&[], &["c1"], &map), 0);

        let empty: IntersectionMap<usize> = IntersectionMap::default();
        assert_eq!(aggregate_count(&["r1"], &["c1"], &empty), 0);
    }

    #[test]
    fn test_aggregate_count_is_additive() {
        let map = create_test_map();
        let cols = ["c1", "c2"];

        let a = aggregate_count(&["r1"], &cols, &map);
        let b = aggregate_count(&["r2"], &cols, &map);
        assert_eq!(aggregate_count(&["r1", "r2"], &cols, &map), a + b);
    }

    #[test]
    fn test_aggregate_count_with_counts() {
        let mut map: IntersectionMap<usize> = IntersectionMap::default();
        map.insert(intersection_key("a", "b"), 4);
        map.insert(intersection_key("a", "c"), 1);

        let rows = vec!["a".to_string()];
        let cols = vec!["b".to_string(), "c".to_string()];
        assert_eq!(aggregate_count(&rows, &cols, &map), 5);
    }

    #[test]
    fn test_build_intersection_map() {
        let records = vec![
            RelationRecord::new("app1", "cap1").with_id("rel-1"),
            RelationRecord::new("app1", "cap1").with_id("rel-2"),
            RelationRecord::new("app2", "cap1"),
        ];
        let map = build_intersection_map(&records);

        assert_eq!(map.len(), 2);
        assert_eq!(map["app1:cap1"].len(), 2);
        assert_eq!(aggregate_count(&["app1", "app2"], &["cap1"], &map), 3);
    }

    #[test]
    fn test_drill_down() {
        let map = create_test_map();

        let found = drill_down(&["r1", "r2"], &["c1"], &map);
        assert_eq!(found, vec![&"x", &"y", &"w"]);
        assert!(drill_down(&["nope"], &["c1"], &map).is_empty());
    }

    #[test]
    fn test_effective_leaf_ids() {
        let tree = build_tree(&[
            TaxonomyItem::root("r", "Root"),
            TaxonomyItem::child("c1", "A", "r"),
            TaxonomyItem::child("c2", "B", "r"),
            TaxonomyItem::child("gc1", "AA", "c1"),
        ])
        .unwrap();

        assert_eq!(get_effective_leaf_ids(tree.find_node("c2").unwrap()), ["c2"]);
        assert_eq!(get_effective_leaf_ids(tree.find_node("r").unwrap()), ["gc1", "c2"]);

        let pruned = prune_tree_to_depth(&tree, 0);
        assert_eq!(get_effective_leaf_ids(pruned.find_node("r").unwrap()), ["gc1", "c2"]);
    }

    #[test]
    fn test_cell_value_modes() {
        assert_eq!(cell_value(0, CellDisplayMode::Exists), MatrixCellValue::Exists(false));
        assert_eq!(cell_value(3, CellDisplayMode::Exists), MatrixCellValue::Exists(true));
        assert_eq!(cell_value(3, CellDisplayMode::Count), MatrixCellValue::Count(3));
    }
}
