//! Structural checker.

use std::collections::HashSet;

use crate::common::{Error, Key, PageId, Result};
use crate::index::btree::node::Node;
use crate::index::btree::BPlusTree;

/// Shape of a tree that passed [`BPlusTree::verify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    /// Levels from root to leaves; 1 for a lone root leaf.
    pub height: usize,
    pub internal_count: usize,
    pub leaf_count: usize,
    pub key_count: usize,
}

/// A subtree to visit with the half-open key range `[lower, upper)` its
/// parent routes to it. `None` is unbounded.
struct Pending {
    page_id: PageId,
    depth: usize,
    lower: Option<Key>,
    upper: Option<Key>,
}

fn in_bounds(key: Key, lower: Option<Key>, upper: Option<Key>) -> bool {
    lower.map_or(true, |lo| key >= lo) && upper.map_or(true, |hi| key < hi)
}

impl BPlusTree {
    /// Walk the whole tree and check its structural invariants.
    ///
    /// Checks that keys are strictly ascending within every node and sit inside
    /// the range their parent routes to them, that every leaf is at the same
    /// depth, that no page is reachable twice, and that following `next_leaf`
    /// from the leftmost leaf visits exactly the leaves in key order and then
    /// ends. Per-node checks (tag, capacity, child count) come from decoding.
    ///
    /// # Errors
    /// `Error::Corruption` describing the first violation found.
    pub fn verify(&mut self) -> Result<TreeSummary> {
        self.store.ensure_operational()?;

        let mut summary = TreeSummary::default();
        let mut seen = HashSet::new();
        let mut leaves = Vec::new();
        let mut stack = vec![Pending {
            page_id: self.store.root_page(),
            depth: 1,
            lower: None,
            upper: None,
        }];

        while let Some(Pending {
            page_id,
            depth,
            lower,
            upper,
        }) = stack.pop()
        {
            self.check_depth(depth)?;
            if !seen.insert(page_id) {
                return Err(Error::corruption(format!("{} is reachable twice", page_id)));
            }

            match self.read_node(page_id)? {
                Node::Leaf(leaf) => {
                    if summary.height == 0 {
                        summary.height = depth;
                    } else if summary.height != depth {
                        return Err(Error::corruption(format!(
                            "leaf {} at depth {}, expected {}",
                            page_id, depth, summary.height
                        )));
                    }
                    if let Some(&bad) = leaf.keys.iter().find(|&&k| !in_bounds(k, lower, upper)) {
                        return Err(Error::corruption(format!(
                            "key {} in leaf {} is outside its routed range",
                            bad, page_id
                        )));
                    }
                    summary.leaf_count += 1;
                    summary.key_count += leaf.len();
                    leaves.push((page_id, leaf.next_leaf));
                }
                Node::Internal(node) => {
                    if let Some(&bad) = node.keys.iter().find(|&&k| !in_bounds(k, lower, upper)) {
                        return Err(Error::corruption(format!(
                            "separator {} in {} is outside its routed range",
                            bad, page_id
                        )));
                    }
                    summary.internal_count += 1;

                    // Reverse so the leftmost child is visited first.
                    for (i, &child) in node.children.iter().enumerate().rev() {
                        stack.push(Pending {
                            page_id: child,
                            depth: depth + 1,
                            lower: if i == 0 { lower } else { Some(node.keys[i - 1]) },
                            upper: node.keys.get(i).copied().or(upper),
                        });
                    }
                }
            }
        }

        for (i, &(page_id, next)) in leaves.iter().enumerate() {
            let expected = leaves.get(i + 1).map_or(PageId::INVALID, |&(p, _)| p);
            if next != expected {
                return Err(Error::corruption(format!(
                    "leaf {} links to {}, expected {}",
                    page_id, next, expected
                )));
            }
        }

        Ok(summary)
    }
}
