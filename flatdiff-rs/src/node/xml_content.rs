//! XML content types for parsed documents.
//!
//! This module provides `XmlNode`, which represents one child of an element:
//! a nested element, a run of character data, or a CDATA section.

/// A child node of a parsed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// A nested element.
    Element(XmlElement),
    /// Literal (entity-decoded, untrimmed) character data.
    Text(String),
    /// Contents of a CDATA section.
    CData(String),
}

impl XmlNode {
    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the character data of a text or CDATA node.
    pub fn as_char_data(&self) -> Option<&str> {
        match self {
            XmlNode::Text(t) | XmlNode::CData(t) => Some(t),
            XmlNode::Element(_) => None,
        }
    }
}

/// An XML element with its attributes and children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates a new element without children.
    pub fn new(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        XmlElement {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Returns the literal tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attributes in the order they appear in the start tag.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Appends a child node.
    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Iterates over the element children only.
    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Concatenates the direct text and CDATA children in document order and
    /// trims the result. Text inside nested elements is not included.
    pub fn direct_text(&self) -> String {
        let mut text = String::new();
        for chunk in self.children.iter().filter_map(XmlNode::as_char_data) {
            text.push_str(chunk);
        }
        text.trim().to_string()
    }
}

// Deep documents would otherwise be freed by one recursive call per level
impl Drop for XmlElement {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let XmlNode::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}
