//! Sibling-indexed path identifiers for editable trees.
//!
//! Node identifiers use the same `name[occurrence]` scheme as the flattener.
//! Because the scheme is positional, inserting, removing or renaming a node
//! shifts the indices of its later same-named siblings; identifiers are
//! therefore always rebuilt from the complete sibling list rather than
//! patched.

use crate::path::{child_path, SiblingCounter};

use super::EditNode;

/// Returns a copy of `nodes` with identifiers reassigned below `parent_path`.
///
/// Each sibling list gets its own occurrence counter; counts never cross
/// subtree boundaries. Reindexing an already indexed tree is a no-op.
pub fn reindex(nodes: &[EditNode], parent_path: &str) -> Vec<EditNode> {
    let mut nodes = nodes.to_vec();
    assign_ids(&mut nodes, parent_path);
    nodes
}

/// In-place variant of [`reindex`] for trees the caller already owns.
///
/// Sibling lists wait on an explicit stack, so depth does not grow the call
/// stack.
pub(crate) fn assign_ids(nodes: &mut [EditNode], parent_path: &str) {
    let mut lists: Vec<(&mut [EditNode], String)> = vec![(nodes, parent_path.to_string())];
    while let Some((siblings, parent)) = lists.pop() {
        let ids: Vec<String> = {
            let mut counter = SiblingCounter::new();
            siblings
                .iter()
                .map(|node| child_path(&parent, &node.name, counter.next(&node.name)))
                .collect()
        };

        for (node, id) in siblings.iter_mut().zip(ids) {
            node.id = id;
            let EditNode {
                id: node_id,
                children,
                ..
            } = node;
            lists.push((children.as_mut_slice(), node_id.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(nodes: &[EditNode]) -> Vec<&str> {
        nodes.iter().map(EditNode::id).collect()
    }

    #[test]
    fn test_indices_per_name() {
        let nodes = vec![
            EditNode::new("b"),
            EditNode::new("c"),
            EditNode::new("b"),
        ];
        let indexed = reindex(&nodes, "a[1]");
        assert_eq!(ids(&indexed), vec!["a[1].b[1]", "a[1].c[1]", "a[1].b[2]"]);
    }

    #[test]
    fn test_counters_do_not_cross_subtrees() {
        let nodes = vec![
            EditNode::new("p").with_child(EditNode::new("v")),
            EditNode::new("p").with_child(EditNode::new("v")),
        ];
        let indexed = reindex(&nodes, "");
        assert_eq!(indexed[0].children()[0].id(), "p[1].v[1]");
        assert_eq!(indexed[1].children()[0].id(), "p[2].v[1]");
    }

    #[test]
    fn test_reindex_is_idempotent() {
        let nodes = vec![EditNode::new("x")
            .with_child(EditNode::new("y"))
            .with_child(EditNode::new("y").with_child(EditNode::new("z")))];
        let once = reindex(&nodes, "");
        let twice = reindex(&once, "");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deep_tree_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(|| {
                let depth = 3_000;
                let mut node = EditNode::new("n");
                for _ in 1..depth {
                    node = EditNode::new("n").with_child(node);
                }
                let indexed = reindex(&[node], "");
                let mut leaf = &indexed[0];
                while let Some(child) = leaf.children().first() {
                    leaf = child;
                }
                assert_eq!(leaf.id().matches("n[1]").count(), depth);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_input_is_not_modified() {
        let nodes = vec![EditNode::new("x")];
        let _ = reindex(&nodes, "root[1]");
        assert_eq!(nodes[0].id(), "");
    }
}
