//! Editable configuration trees.
//!
//! An `EditTree` is built from a parsed document and edited copy-on-write:
//! every operation returns a new tree and leaves the receiver untouched, so
//! earlier snapshots stay valid for [`History`] replay. Node identifiers are
//! canonical paths and are regenerated for the affected sibling list after
//! every structural change.

mod history;
mod indexer;

pub use history::History;
pub use indexer::reindex;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::flatten::FlatMapping;
use crate::node::{XmlDocument, XmlElement};
use crate::path::{attr_key, is_within, text_key};
use crate::xml::{is_valid_name, print_tree, PrintOptions};

use indexer::assign_ids;

/// A node of an editable tree.
///
/// Cloning and dropping walk the subtree with an explicit stack, so deep
/// trees do not exhaust the call stack.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EditNode {
    id: String,
    name: String,
    value: String,
    attributes: BTreeMap<String, String>,
    children: Vec<EditNode>,
}

impl EditNode {
    /// Creates a detached node. Its id is assigned when it joins a tree.
    pub fn new(name: impl Into<String>) -> Self {
        EditNode {
            id: String::new(),
            name: name.into(),
            value: String::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: EditNode) -> Self {
        self.children.push(child);
        self
    }

    /// Canonical path of this node.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[EditNode] {
        &self.children
    }

    fn from_element(element: &XmlElement) -> Self {
        build_tree(
            element,
            |e| {
                let mut node = EditNode::new(e.name());
                node.value = e.direct_text();
                node.attributes = e.attributes().iter().cloned().collect();
                node
            },
            |e| e.child_elements().collect(),
        )
    }

    /// Copy of this node without its children.
    fn shallow_copy(&self) -> Self {
        let mut node = EditNode::new(self.name.as_str());
        node.id = self.id.clone();
        node.value = self.value.clone();
        node.attributes = self.attributes.clone();
        node
    }
}

impl Clone for EditNode {
    fn clone(&self) -> Self {
        build_tree(self, EditNode::shallow_copy, |n| n.children.iter().collect())
    }
}

impl Drop for EditNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Builds an `EditNode` tree mirroring `root` without recursion.
///
/// `shell` creates a childless node for one source node and `children`
/// lists the source children in order.
fn build_tree<'a, S>(
    root: &'a S,
    shell: impl Fn(&'a S) -> EditNode,
    children: impl Fn(&'a S) -> Vec<&'a S>,
) -> EditNode {
    let mut stack = vec![(shell(root), children(root).into_iter())];
    let mut built = EditNode::default();
    while let Some((node, mut pending)) = stack.pop() {
        if let Some(child) = pending.next() {
            stack.push((node, pending));
            stack.push((shell(child), children(child).into_iter()));
            continue;
        }
        match stack.last_mut() {
            Some((parent, _)) => parent.children.push(node),
            None => built = node,
        }
    }
    built
}

/// An editable document: its top-level nodes, normally a single root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTree {
    roots: Vec<EditNode>,
}

/// Position of a node: indices from the top-level list down to the node.
type NodePosition = Vec<usize>;

impl EditTree {
    /// Builds an indexed tree from top-level nodes.
    pub fn new(roots: Vec<EditNode>) -> Self {
        EditTree {
            roots: reindex(&roots, ""),
        }
    }

    /// Builds a tree from a parsed document.
    pub fn from_document(document: &XmlDocument) -> Self {
        let mut roots: Vec<EditNode> = document.root_elements().map(EditNode::from_element).collect();
        assign_ids(&mut roots, "");
        EditTree { roots }
    }

    pub fn roots(&self) -> &[EditNode] {
        &self.roots
    }

    /// Finds the node with the given canonical path.
    pub fn node(&self, id: &str) -> Option<&EditNode> {
        let position = self.locate(id)?;
        let mut nodes = &self.roots;
        let mut found = None;
        for index in position {
            let node = nodes.get(index)?;
            nodes = &node.children;
            found = Some(node);
        }
        found
    }

    /// Returns a tree without the node `id` and its subtree.
    pub fn delete(&self, id: &str) -> Result<EditTree> {
        self.edit_siblings(id, |siblings, index| {
            siblings.remove(index);
            Ok(())
        })
    }

    /// Returns a tree with a deep copy of `id` inserted right after it.
    pub fn duplicate(&self, id: &str) -> Result<EditTree> {
        self.edit_siblings(id, |siblings, index| {
            let copy = siblings[index].clone();
            siblings.insert(index + 1, copy);
            Ok(())
        })
    }

    /// Returns a tree in which `id` carries a new element name.
    pub fn rename(&self, id: &str, name: &str) -> Result<EditTree> {
        if !is_valid_name(name) {
            return Err(Error::InvalidName(name.to_string()));
        }
        self.edit_siblings(id, |siblings, index| {
            siblings[index].name = name.to_string();
            Ok(())
        })
    }

    /// Returns a tree with `child` appended to the children of `parent_id`.
    pub fn append_child(&self, parent_id: &str, child: EditNode) -> Result<EditTree> {
        if !is_valid_name(&child.name) {
            return Err(Error::InvalidName(child.name().to_string()));
        }
        self.edit_node(parent_id, |node| {
            node.children.push(child);
            assign_ids(&mut node.children, &node.id);
            Ok(())
        })
    }

    /// Returns a tree in which `id` has the given text value.
    pub fn set_value(&self, id: &str, value: &str) -> Result<EditTree> {
        self.edit_node(id, |node| {
            node.value = value.to_string();
            Ok(())
        })
    }

    /// Returns a tree in which attribute `name` of `id` is set to `value`.
    pub fn set_attribute(&self, id: &str, name: &str, value: &str) -> Result<EditTree> {
        if !is_valid_name(name) {
            return Err(Error::InvalidName(name.to_string()));
        }
        self.edit_node(id, |node| {
            node.attributes.insert(name.to_string(), value.to_string());
            Ok(())
        })
    }

    /// Returns a tree in which `id` no longer has attribute `name`.
    pub fn remove_attribute(&self, id: &str, name: &str) -> Result<EditTree> {
        self.edit_node(id, |node| {
            node.attributes.remove(name);
            Ok(())
        })
    }

    /// Flattens the tree with the same key scheme as the document flattener.
    pub fn flatten(&self) -> FlatMapping {
        let mut mapping = FlatMapping::new();
        let mut stack: Vec<&EditNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            for (name, value) in &node.attributes {
                mapping.insert(attr_key(&node.id, name), value.as_str());
            }
            let text = node.value.trim();
            if !text.is_empty() {
                mapping.insert(text_key(&node.id), text);
            }
            stack.extend(node.children.iter().rev());
        }
        mapping
    }

    /// Serializes the tree back into an XML document.
    pub fn to_xml(&self, options: &PrintOptions) -> Result<String> {
        print_tree(self, options)
    }

    /// Finds the child-index position of `id`.
    fn locate(&self, id: &str) -> Option<NodePosition> {
        let mut position = Vec::new();
        let mut nodes = &self.roots;
        loop {
            let (index, node) = nodes
                .iter()
                .enumerate()
                .find(|(_, node)| is_within(id, &node.id))?;
            position.push(index);
            if node.id == id {
                return Some(position);
            }
            nodes = &node.children;
        }
    }

    /// Copies the tree and applies `edit` to the node at `id`.
    fn edit_node<F>(&self, id: &str, edit: F) -> Result<EditTree>
    where
        F: FnOnce(&mut EditNode) -> Result<()>,
    {
        let position = self
            .locate(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        let mut next = self.clone();
        let mut nodes = &mut next.roots;
        let (last, parents) = position
            .split_last()
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        for &index in parents {
            nodes = &mut nodes[index].children;
        }
        edit(&mut nodes[*last])?;
        Ok(next)
    }

    /// Copies the tree, applies `edit` to the sibling list containing `id`
    /// and reindexes that list.
    fn edit_siblings<F>(&self, id: &str, edit: F) -> Result<EditTree>
    where
        F: FnOnce(&mut Vec<EditNode>, usize) -> Result<()>,
    {
        let position = self
            .locate(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        let (index, parents) = position
            .split_last()
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;

        let mut next = self.clone();
        let mut parent_id = String::new();
        let mut siblings = &mut next.roots;
        for &i in parents {
            let parent = &mut siblings[i];
            parent_id = parent.id.clone();
            siblings = &mut parent.children;
        }
        edit(siblings, *index)?;
        assign_ids(siblings, &parent_id);
        debug!(node = id, parent = parent_id.as_str(), "reindexed siblings");
        Ok(next)
    }
}

/// Edit session: the current tree plus its undo history.
#[derive(Debug, Clone)]
pub struct Editor {
    history: History<EditTree>,
}

impl Editor {
    pub fn new(tree: EditTree) -> Self {
        Editor {
            history: History::new(tree),
        }
    }

    pub fn tree(&self) -> &EditTree {
        self.history.current()
    }

    /// Applies an edit. On failure the current tree and history are unchanged.
    pub fn apply<F>(&mut self, edit: F) -> Result<&EditTree>
    where
        F: FnOnce(&EditTree) -> Result<EditTree>,
    {
        let next = edit(self.history.current())?;
        self.history.record(next);
        Ok(self.history.current())
    }

    pub fn undo(&mut self) -> Option<&EditTree> {
        self.history.undo()
    }

    pub fn redo(&mut self) -> Option<&EditTree> {
        self.history.redo()
    }

    pub fn history(&self) -> &History<EditTree> {
        &self.history
    }
}
