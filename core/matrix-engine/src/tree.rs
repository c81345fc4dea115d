//! FILENAME: core/matrix-engine/src/tree.rs
//! Taxonomy Tree - The ordered forest built from a flat item list.
//!
//! Nodes live in an arena (`Vec<TreeNode>`) addressed by `NodeId`. Parent
//! relations stay identifier-based: a node knows its `parent_id`, and the
//! tree carries an id -> NodeId lookup table next to the arena.
//!
//! Arena invariant: nodes are stored in depth-first preorder, so every
//! child has a larger NodeId than its parent. Bottom-up passes simply walk
//! the arena in reverse.
//!
//! Algorithm (build_tree):
//! 1. Index items by id (duplicates are rejected)
//! 2. Link children to parents; unresolvable parents become roots
//! 3. Sort roots and siblings by name
//! 4. Walk depth-first from the roots, assigning arena slots and depths
//! 5. Items never reached hang off a parent cycle -> CyclicHierarchy
//! 6. Compute leaf descendants and counts bottom-up

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use crate::definition::TaxonomyItem;
use crate::error::{MatrixError, MatrixResult};
use crate::traversal::build_all_nodes_map;

/// Index of a node in its tree's arena.
pub type NodeId = usize;

// ============================================================================
// TREE NODE
// ============================================================================

/// Structural variant of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A true leaf: the item has no children in the source data.
    Leaf,
    /// An internal node with its children in name order.
    Group { children: Vec<NodeId> },
    /// An internal node collapsed into a virtual leaf by depth-limiting.
    PrunedGroup,
}

/// A node in a taxonomy tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// The source item.
    pub item: TaxonomyItem,

    /// Leaf, group, or pruned group.
    pub kind: NodeKind,

    /// Depth in the tree (0 = root level).
    pub depth: usize,

    /// Number of true leaves in this subtree. Equals `leaf_descendants.len()`,
    /// also for pruned groups.
    pub leaf_count: usize,

    /// Ids of the true leaves in this subtree, depth-first, left to right.
    /// Unchanged by pruning.
    pub leaf_descendants: Vec<String>,

    /// `leaf_count` as computed on the un-pruned tree.
    pub original_leaf_count: usize,

    /// Number of displayed leaf slots (true leaves plus pruned groups) in this
    /// subtree of the current tree. Header spans are measured in these.
    pub visible_leaf_count: usize,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group { children } => children,
            NodeKind::Leaf | NodeKind::PrunedGroup => &[],
        }
    }

    /// True for true leaves and pruned groups alike.
    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn is_pruned_group(&self) -> bool {
        matches!(self.kind, NodeKind::PrunedGroup)
    }
}

// ============================================================================
// TAXONOMY TREE
// ============================================================================

/// An ordered forest plus its id lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    all_nodes: FxHashMap<String, NodeId>,
    max_depth: usize,
}

impl TaxonomyTree {
    /// Wraps a preorder arena, filling in visible leaf counts, max depth and
    /// the id lookup table.
    pub(crate) fn from_arena(mut nodes: Vec<TreeNode>, roots: Vec<NodeId>) -> Self {
        for id in (0..nodes.len()).rev() {
            let visible = match &nodes[id].kind {
                NodeKind::Group { children } => children
                    .iter()
                    .map(|&child| nodes[child].visible_leaf_count)
                    .sum::<usize>()
                    .max(1),
                NodeKind::Leaf | NodeKind::PrunedGroup => 1,
            };
            nodes[id].visible_leaf_count = visible;
        }

        let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);

        let mut tree = TaxonomyTree {
            nodes,
            roots,
            all_nodes: FxHashMap::default(),
            max_depth,
        };
        tree.all_nodes = build_all_nodes_map(&tree);
        tree
    }

    /// Root node ids, in name order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root nodes, in name order.
    pub fn root_nodes(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.roots.iter().map(move |&id| &self.nodes[id])
    }

    /// The arena, in depth-first preorder.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Returns the node for an id handed out by this tree.
    ///
    /// # Panics
    /// If `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Looks up a node by item id.
    pub fn find(&self, item_id: &str) -> Option<NodeId> {
        self.all_nodes.get(item_id).copied()
    }

    pub fn find_node(&self, item_id: &str) -> Option<&TreeNode> {
        self.find(item_id).map(|id| &self.nodes[id])
    }

    /// The item id -> NodeId table for every node in this tree.
    pub fn all_nodes(&self) -> &FxHashMap<String, NodeId> {
        &self.all_nodes
    }

    /// Deepest depth present (0 for a flat or empty tree).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of true leaves under all roots.
    pub fn total_leaf_count(&self) -> usize {
        self.root_nodes().map(|n| n.leaf_count).sum()
    }

    /// Number of displayed leaf slots under all roots.
    pub fn visible_leaf_count(&self) -> usize {
        self.root_nodes().map(|n| n.visible_leaf_count).sum()
    }

    /// Every true leaf id of the forest, in leaf order.
    pub fn all_leaf_ids(&self) -> Vec<&str> {
        self.root_nodes()
            .flat_map(|n| n.leaf_descendants.iter().map(String::as_str))
            .collect()
    }

    /// Depth-first, left-to-right traversal over all nodes.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

/// Iterator returned by [`TaxonomyTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a TaxonomyTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children().iter().rev().copied());
        Some(id)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds an ordered forest from a flat item list.
///
/// Items whose `parent_id` does not resolve are treated as roots. Fails on a
/// duplicate id or a cyclic parent chain.
pub fn build_tree(items: &[TaxonomyItem]) -> MatrixResult<TaxonomyTree> {
    if items.is_empty() {
        return Ok(TaxonomyTree::default());
    }

    // Step 1: Index items by id
    let mut position: FxHashMap<&str, usize> =
        FxHashMap::with_capacity_and_hasher(items.len(), Default::default());
    for (idx, item) in items.iter().enumerate() {
        if position.insert(item.id.as_str(), idx).is_some() {
            return Err(MatrixError::DuplicateItemId(item.id.clone()));
        }
    }

    // Step 2: Link children to parents
    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut root_items: Vec<usize> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match resolve_parent(item, &position) {
            Some(parent) => children_of[parent].push(idx),
            None => {
                if let Some(parent_id) = &item.parent_id {
                    log::warn!(
                        "item {} references unknown parent {}, treating it as a root",
                        item.id,
                        parent_id
                    );
                }
                root_items.push(idx);
            }
        }
    }

    // Step 3: Sort roots and siblings by name
    sort_by_name(&mut root_items, items);
    for siblings in &mut children_of {
        sort_by_name(siblings, items);
    }

    // Step 4: Depth-first walk, assigning arena slots in preorder
    let mut slot_of: Vec<Option<NodeId>> = vec![None; items.len()];
    let mut order: Vec<(usize, usize)> = Vec::with_capacity(items.len());
    let mut stack: Vec<(usize, usize)> = root_items.iter().rev().map(|&idx| (idx, 0)).collect();
    while let Some((idx, depth)) = stack.pop() {
        slot_of[idx] = Some(order.len());
        order.push((idx, depth));
        stack.extend(children_of[idx].iter().rev().map(|&child| (child, depth + 1)));
    }

    // Step 5: Items unreachable from a root sit on or under a parent cycle
    if let Some(unreached) = slot_of.iter().position(Option::is_none) {
        return Err(find_cycle(items, &position, unreached));
    }

    // Step 6: Materialize the arena, then fill leaf metadata bottom-up
    let mut nodes: Vec<TreeNode> = order
        .iter()
        .map(|&(idx, depth)| {
            let children: Vec<NodeId> = children_of[idx]
                .iter()
                .filter_map(|&child| slot_of[child])
                .collect();
            let kind = if children.is_empty() {
                NodeKind::Leaf
            } else {
                NodeKind::Group { children }
            };
            TreeNode {
                item: items[idx].clone(),
                kind,
                depth,
                leaf_count: 1,
                leaf_descendants: Vec::new(),
                original_leaf_count: 1,
                visible_leaf_count: 1,
            }
        })
        .collect();

    for id in (0..nodes.len()).rev() {
        let descendants: Vec<String> = match &nodes[id].kind {
            NodeKind::Group { children } => children
                .iter()
                .flat_map(|&child| nodes[child].leaf_descendants.iter().cloned())
                .collect(),
            NodeKind::Leaf | NodeKind::PrunedGroup => vec![nodes[id].item.id.clone()],
        };
        let node = &mut nodes[id];
        node.leaf_count = descendants.len();
        node.original_leaf_count = descendants.len();
        node.leaf_descendants = descendants;
    }

    let roots: Vec<NodeId> = root_items.iter().filter_map(|&idx| slot_of[idx]).collect();
    let tree = TaxonomyTree::from_arena(nodes, roots);

    log::debug!(
        "built taxonomy tree: nodes={} roots={} max_depth={}",
        tree.len(),
        tree.roots().len(),
        tree.max_depth()
    );

    Ok(tree)
}

fn resolve_parent(item: &TaxonomyItem, position: &FxHashMap<&str, usize>) -> Option<usize> {
    item.parent_id
        .as_deref()
        .and_then(|parent_id| position.get(parent_id))
        .copied()
}

/// Case-sensitive, stable sort on item name.
fn sort_by_name(ids: &mut [usize], items: &[TaxonomyItem]) {
    ids.sort_by(|&a, &b| items[a].name.cmp(&items[b].name));
}

/// Walks up from `start` until an item repeats and reports that loop.
fn find_cycle(
    items: &[TaxonomyItem],
    position: &FxHashMap<&str, usize>,
    start: usize,
) -> MatrixError {
    let mut path: Vec<usize> = Vec::new();
    let mut current = Some(start);

    while let Some(idx) = current {
        if let Some(at) = path.iter().position(|&seen| seen == idx) {
            let mut cycle: Vec<String> = path[at..].iter().map(|&i| items[i].id.clone()).collect();
            cycle.push(items[idx].id.clone());
            return MatrixError::CyclicHierarchy { cycle };
        }
        path.push(idx);
        current = resolve_parent(&items[idx], position);
    }

    // Only reachable if `start` was in fact connected to a root.
    MatrixError::CyclicHierarchy {
        cycle: path.iter().map(|&i| items[i].id.clone()).collect(),
    }
}
