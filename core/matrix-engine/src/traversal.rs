//! FILENAME: core/matrix-engine/src/traversal.rs
//! Leaf and traversal utilities shared by layout and aggregation.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use crate::error::{MatrixError, MatrixResult};
use crate::tree::{NodeId, TaxonomyTree, TreeNode};

/// Ancestor chains are short in practice; keep them on the stack.
pub type AncestorChain = SmallVec<[NodeId; 8]>;

/// Leaf item ids in depth-first, left-to-right order. This is the canonical
/// row/column order of the rendered grid.
pub fn get_leaf_order(tree: &TaxonomyTree) -> Vec<&str> {
    get_leaf_nodes(tree).into_iter().map(TreeNode::id).collect()
}

/// Same traversal as [`get_leaf_order`], returning the nodes.
pub fn get_leaf_nodes(tree: &TaxonomyTree) -> Vec<&TreeNode> {
    leaf_node_ids(tree).into_iter().map(|id| tree.node(id)).collect()
}

pub fn leaf_node_ids(tree: &TaxonomyTree) -> Vec<NodeId> {
    tree.preorder().filter(|&id| tree.node(id).is_leaf()).collect()
}

/// Returns `[root, ..., node]` by following `parent_id` through the tree's
/// id table. The walk stops at a node whose parent is not in the table.
pub fn get_ancestor_chain(tree: &TaxonomyTree, node: NodeId) -> MatrixResult<AncestorChain> {
    let mut chain = AncestorChain::new();
    let mut current = Some(node);

    while let Some(id) = current {
        if let Some(at) = chain.iter().position(|&seen| seen == id) {
            let mut cycle: Vec<String> = chain[at..]
                .iter()
                .map(|&seen| tree.node(seen).item.id.clone())
                .collect();
            cycle.push(tree.node(id).item.id.clone());
            return Err(MatrixError::CyclicHierarchy { cycle });
        }
        chain.push(id);
        current = tree
            .node(id)
            .item
            .parent_id
            .as_deref()
            .and_then(|parent_id| tree.find(parent_id));
    }

    chain.reverse();
    Ok(chain)
}

/// Flattens a (possibly pruned) forest into an item id -> NodeId table.
pub fn build_all_nodes_map(tree: &TaxonomyTree) -> FxHashMap<String, NodeId> {
    let mut map = FxHashMap::with_capacity_and_hasher(tree.len(), Default::default());
    for id in tree.preorder() {
        map.insert(tree.node(id).item.id.clone(), id);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TaxonomyItem;
    use crate::prune::prune_tree_to_depth;
    use crate::tree::build_tree;

    fn create_test_tree() -> TaxonomyTree {
        build_tree(&[
            TaxonomyItem::root("cap", "Capabilities"),
            TaxonomyItem::child("fin", "Finance", "cap"),
            TaxonomyItem::child("hr", "HR", "cap"),
            TaxonomyItem::child("ap", "Payables", "fin"),
            TaxonomyItem::child("ar", "Receivables", "fin"),
            TaxonomyItem::root("ops", "Operations"),
        ])
        .unwrap()
    }

    #[test]
    fn test_leaf_order() {
        let tree = create_test_tree();
        assert_eq!(get_leaf_order(&tree), vec!["ap", "ar", "hr", "ops"]);
    }

    #[test]
    fn test_leaf_order_of_pruned_tree() {
        let tree = create_test_tree();
        let pruned = prune_tree_to_depth(&tree, 1);

        assert_eq!(get_leaf_order(&pruned), vec!["fin", "hr", "ops"]);
        let nodes = get_leaf_nodes(&pruned);
        assert!(nodes[0].is_pruned_group());
        assert!(!nodes[1].is_pruned_group());
    }

    #[test]
    fn test_leaf_order_empty() {
        let tree = build_tree(&[]).unwrap();
        assert!(get_leaf_order(&tree).is_empty());
        assert!(get_leaf_nodes(&tree).is_empty());
    }

    #[test]
    fn test_ancestor_chain() {
        let tree = create_test_tree();
        let ar = tree.find("ar").unwrap();

        let chain = get_ancestor_chain(&tree, ar).unwrap();
        let ids: Vec<&str> = chain.iter().map(|&id| tree.node(id).id()).collect();
        assert_eq!(ids, vec!["cap", "fin", "ar"]);

        let ops = tree.find("ops").unwrap();
        assert_eq!(get_ancestor_chain(&tree, ops).unwrap().as_slice(), &[ops]);
    }

    #[test]
    fn test_ancestor_chain_stops_at_dangling_parent() {
        let tree = build_tree(&[
            TaxonomyItem::child("a", "A", "gone"),
            TaxonomyItem::child("b", "B", "a"),
        ])
        .unwrap();
        let b = tree.find("b").unwrap();

        let chain = get_ancestor_chain(&tree, b).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(tree.node(chain[0]).id(), "a");
    }

    #[test]
    fn test_all_nodes_map() {
        let tree = create_test_tree();
        let map = build_all_nodes_map(&tree);

        assert_eq!(map.len(), tree.len());
        for (id, &node) in &map {
            assert_eq!(tree.node(node).id(), id);
        }

        let pruned = prune_tree_to_depth(&tree, 1);
        let pruned_map = build_all_nodes_map(&pruned);
        assert_eq!(pruned_map.len(), 4);
        assert!(!pruned_map.contains_key("ap"));
    }
}
