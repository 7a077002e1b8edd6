//! Parsed XML document model.
//!
//! The parser produces an `XmlDocument` holding the top-level nodes of the
//! input. Elements keep their attributes and children in document order so
//! that sibling indices can be derived later.

mod xml_content;

pub use xml_content::{XmlElement, XmlNode};

/// A parsed XML document.
///
/// The parser guarantees exactly one top-level element; the remaining
/// top-level nodes are whitespace-only text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    children: Vec<XmlNode>,
}

impl XmlDocument {
    /// Creates a document from its top-level nodes.
    pub fn new(children: Vec<XmlNode>) -> Self {
        XmlDocument { children }
    }

    /// Returns the top-level nodes.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Iterates over the top-level elements.
    pub fn root_elements(&self) -> impl DoubleEndedIterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Returns the first top-level element.
    pub fn root(&self) -> Option<&XmlElement> {
        self.root_elements().next()
    }
}
