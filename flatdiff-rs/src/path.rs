//! Canonical path construction.
//!
//! A canonical path is a `.`-separated list of `name[index]` segments where
//! `index` is the 1-based occurrence of `name` among the element children of
//! one parent. Both the flattener and the editor indexer build paths through
//! this module so the two always agree.

use rustc_hash::FxHashMap;

use crate::constants::{ATTR_MARKER, SEGMENT_SEPARATOR, TEXT_SUFFIX};

/// Per-parent occurrence counter.
///
/// A fresh counter must be used for every sibling list; counts never carry
/// over between parents.
#[derive(Debug, Default)]
pub struct SiblingCounter<'a> {
    seen: FxHashMap<&'a str, usize>,
}

impl<'a> SiblingCounter<'a> {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more occurrence of `name` and returns its 1-based index.
    pub fn next(&mut self, name: &'a str) -> usize {
        let count = self.seen.entry(name).or_insert(0);
        *count += 1;
        *count
    }
}

/// Formats a single `name[index]` segment.
pub fn segment(name: &str, index: usize) -> String {
    format!("{}[{}]", name, index)
}

/// Appends a segment to a parent path. An empty parent denotes the document.
pub fn child_path(parent: &str, name: &str, index: usize) -> String {
    if parent.is_empty() {
        segment(name, index)
    } else {
        format!("{}{}{}", parent, SEGMENT_SEPARATOR, segment(name, index))
    }
}

/// Appends a segment to `path` in place. An empty path denotes the document.
pub fn push_segment(path: &mut String, name: &str, index: usize) {
    if !path.is_empty() {
        path.push(SEGMENT_SEPARATOR);
    }
    path.push_str(name);
    path.push('[');
    path.push_str(&index.to_string());
    path.push(']');
}

/// Key addressing attribute `attr` of the element at `path`.
pub fn attr_key(path: &str, attr: &str) -> String {
    format!("{}{}{}", path, ATTR_MARKER, attr)
}

/// Key addressing the text content of the element at `path`.
pub fn text_key(path: &str) -> String {
    format!("{}{}", path, TEXT_SUFFIX)
}

/// Returns true if `path` is `ancestor` itself or lies inside its subtree.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEGMENT_SEPARATOR),
        None => false,
    }
}
