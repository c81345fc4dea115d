//! FILENAME: core/matrix-engine/src/prune.rs
//! Depth Pruner - Depth-limited views of a built tree.
//!
//! Pruning never touches the source tree. It produces a new arena in which
//! every node at `depth >= visible_depth` is a childless virtual leaf that
//! still remembers its full set of leaf descendants.

use crate::definition::VisibleDepth;
use crate::tree::{NodeId, NodeKind, TaxonomyTree, TreeNode};

/// Returns a new forest cut off at `visible_depth`.
///
/// - Nodes shallower than the cutoff are cloned with pruned children.
/// - Nodes at the cutoff become `PrunedGroup` if they had children, and stay
///   `Leaf` otherwise.
/// - A cutoff beyond the tree's max depth yields an identical tree.
pub fn prune_tree_to_depth(tree: &TaxonomyTree, visible_depth: usize) -> TaxonomyTree {
    // Pass 1: collect the nodes that remain visible, in preorder
    let mut new_id: Vec<Option<NodeId>> = vec![None; tree.len()];
    let mut visible: Vec<NodeId> = Vec::with_capacity(tree.len());
    let mut stack: Vec<NodeId> = tree.roots().iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        new_id[id] = Some(visible.len());
        visible.push(id);
        let node = tree.node(id);
        if node.depth < visible_depth {
            stack.extend(node.children().iter().rev().copied());
        }
    }

    // Pass 2: clone them into the new arena
    let mut nodes: Vec<TreeNode> = visible
        .iter()
        .map(|&id| {
            let node = tree.node(id);
            let kind = if node.depth >= visible_depth {
                match node.kind {
                    NodeKind::Leaf => NodeKind::Leaf,
                    NodeKind::Group { .. } | NodeKind::PrunedGroup => NodeKind::PrunedGroup,
                }
            } else {
                match &node.kind {
                    NodeKind::Group { children } => NodeKind::Group {
                        children: children.iter().filter_map(|&child| new_id[child]).collect(),
                    },
                    other => other.clone(),
                }
            };

            TreeNode {
                item: node.item.clone(),
                kind,
                depth: node.depth,
                leaf_count: node.leaf_count,
                leaf_descendants: node.leaf_descendants.clone(),
                original_leaf_count: node.original_leaf_count,
                visible_leaf_count: 1,
            }
        })
        .collect();

    // Pass 3: leaf counts bottom-up
    for id in (0..nodes.len()).rev() {
        let leaf_count = match &nodes[id].kind {
            NodeKind::Group { children } => children
                .iter()
                .map(|&child| nodes[child].leaf_count)
                .sum::<usize>()
                .max(1),
            NodeKind::PrunedGroup => nodes[id].original_leaf_count,
            NodeKind::Leaf => 1,
        };
        nodes[id].leaf_count = leaf_count;
    }

    let roots: Vec<NodeId> = tree.roots().iter().filter_map(|&id| new_id[id]).collect();
    let pruned = TaxonomyTree::from_arena(nodes, roots);

    log::trace!(
        "pruned tree to depth {}: {} -> {} nodes",
        visible_depth,
        tree.len(),
        pruned.len()
    );

    pruned
}

/// Applies a [`VisibleDepth`] setting; `All` returns an unpruned copy.
pub fn prune_to(tree: &TaxonomyTree, depth: VisibleDepth) -> TaxonomyTree {
    match depth.limit() {
        Some(limit) => prune_tree_to_depth(tree, limit),
        None => tree.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TaxonomyItem;
    use crate::tree::build_tree;

    fn create_test_tree() -> TaxonomyTree {
        build_tree(&[
            TaxonomyItem::root("r", "Root"),
            TaxonomyItem::child("c1", "A", "r"),
            TaxonomyItem::child("c2", "B", "r"),
            TaxonomyItem::child("gc1", "AA", "c1"),
        ])
        .unwrap()
    }

    #[test]
    fn test_prune_marks_internal_node() {
        let tree = create_test_tree();
        let pruned = prune_tree_to_depth(&tree, 1);

        let c1 = pruned.find_node("c1").unwrap();
        assert!(c1.is_pruned_group());
        assert!(c1.is_leaf());
        assert!(c1.children().is_empty());
        assert_eq!(c1.leaf_descendants, vec!["gc1"]);
        assert_eq!(c1.leaf_count, 1);

        // A genuine leaf at the cutoff is not a pruned group
        let c2 = pruned.find_node("c2").unwrap();
        assert_eq!(c2.kind, NodeKind::Leaf);

        // Hidden nodes are gone from the view, but not from the source
        assert!(pruned.find("gc1").is_none());
        assert!(tree.find("gc1").is_some());
        assert_eq!(pruned.max_depth(), 1);
    }

    #[test]
    fn test_prune_beyond_depth_is_noop() {
        let tree = create_test_tree();

        for depth in [tree.max_depth(), tree.max_depth() + 1, 50] {
            let pruned = prune_tree_to_depth(&tree, depth);
            assert_eq!(pruned, tree);
            assert!(pruned.nodes().iter().all(|n| !n.is_pruned_group()));
        }
    }

    #[test]
    fn test_prune_to_zero_collapses_roots() {
        let tree = build_tree(&[
            TaxonomyItem::root("r", "Root"),
            TaxonomyItem::child("c1", "A", "r"),
            TaxonomyItem::child("c2", "B", "r"),
            TaxonomyItem::root("solo", "Solo"),
        ])
        .unwrap();
        let pruned = prune_tree_to_depth(&tree, 0);

        assert_eq!(pruned.len(), 2);
        assert_eq!(pruned.max_depth(), 0);
        let root = pruned.find_node("r").unwrap();
        assert!(root.is_pruned_group());
        assert_eq!(root.leaf_count, 2);
        assert_eq!(root.original_leaf_count, 2);
        assert_eq!(root.visible_leaf_count, 1);
        assert_eq!(pruned.find_node("solo").unwrap().kind, NodeKind::Leaf);
        assert_eq!(pruned.visible_leaf_count(), 2);
        assert_eq!(pruned.total_leaf_count(), 3);
    }

    #[test]
    fn test_prune_preserves_leaf_counts() {
        let tree = create_test_tree();
        let pruned = prune_tree_to_depth(&tree, 1);

        let root = pruned.find_node("r").unwrap();
        assert_eq!(root.leaf_count, 2);
        assert_eq!(root.visible_leaf_count, 2);
        for node in pruned.nodes() {
            assert_eq!(node.leaf_count, node.leaf_descendants.len());
        }
    }

    #[test]
    fn test_prune_to_setting() {
        let tree = create_test_tree();

        assert_eq!(prune_to(&tree, VisibleDepth::All), tree);
        assert_eq!(
            prune_to(&tree, VisibleDepth::Limited(1)),
            prune_tree_to_depth(&tree, 1)
        );
    }

    #[test]
    fn test_prune_pruned_tree_keeps_groups_closed() {
        let tree = create_test_tree();
        let once = prune_tree_to_depth(&tree, 1);
        let twice = prune_tree_to_depth(&once, 5);

        assert_eq!(once, twice);
    }
}
