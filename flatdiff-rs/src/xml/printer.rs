//! XML printer that outputs editable trees.
//!
//! Each node becomes an element, a non-empty value becomes a single text
//! child written before any child elements, and attributes are written in
//! name order.

use std::io::Write;

use crate::editor::{EditNode, EditTree};
use crate::error::{Error, Result};

use super::is_valid_name;

/// Options for XML printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Whether to pretty-print with indentation.
    pub pretty: bool,
    /// Whether to start with an XML declaration.
    pub declaration: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            pretty: false,
            declaration: true,
        }
    }
}

/// XML printer writing to any `Write` sink.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: PrintOptions,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer with the given options.
    pub fn new(writer: W, options: PrintOptions) -> Self {
        XmlPrinter { writer, options }
    }

    /// Prints a tree. The tree is validated before anything is written.
    pub fn print(&mut self, tree: &EditTree) -> Result<()> {
        let root = match tree.roots() {
            [root] => root,
            [] => return Err(Error::Serialize("document has no root element".to_string())),
            _ => {
                return Err(Error::Serialize(
                    "document has more than one root element".to_string(),
                ))
            }
        };
        validate(root)?;

        if self.options.declaration {
            writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        }
        self.print_nodes(root)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the subtree below `root`. Pending tags wait on an explicit
    /// stack so document depth does not grow the call stack.
    fn print_nodes(&mut self, root: &EditNode) -> Result<()> {
        let mut steps = vec![Step::Open(root, 0)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Open(node, depth) => {
                    if self.open_tag(node, depth)? {
                        steps.push(Step::Close(node, depth));
                        steps.extend(node.children().iter().rev().map(|c| Step::Open(c, depth + 1)));
                    }
                }
                Step::Close(node, depth) => self.close_tag(node, depth)?,
            }
        }
        Ok(())
    }

    /// Writes the start tag and value. Returns false if the element was
    /// written self-closed.
    fn open_tag(&mut self, node: &EditNode, depth: usize) -> Result<bool> {
        let pretty = self.options.pretty;
        if pretty && depth > 0 {
            writeln!(self.writer)?;
            write!(self.writer, "{}", indent_str(depth))?;
        }

        write!(self.writer, "<{}", node.name())?;
        for (name, value) in node.attributes() {
            write!(self.writer, " {}=\"{}\"", name, to_entities(value))?;
        }

        if node.value().is_empty() && node.children().is_empty() {
            write!(self.writer, " />")?;
            return Ok(false);
        }
        write!(self.writer, ">")?;

        if !node.value().is_empty() {
            if pretty && !node.children().is_empty() {
                writeln!(self.writer)?;
                write!(self.writer, "{}", indent_str(depth + 1))?;
            }
            write!(self.writer, "{}", to_entities(node.value()))?;
        }
        Ok(true)
    }

    fn close_tag(&mut self, node: &EditNode, depth: usize) -> Result<()> {
        if self.options.pretty && !node.children().is_empty() {
            writeln!(self.writer)?;
            write!(self.writer, "{}", indent_str(depth))?;
        }
        write!(self.writer, "</{}>", node.name())?;
        Ok(())
    }
}

enum Step<'a> {
    Open(&'a EditNode, usize),
    Close(&'a EditNode, usize),
}

/// Checks every element and attribute name below `root`.
fn validate(root: &EditNode) -> Result<()> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !is_valid_name(node.name()) {
            return Err(Error::Serialize(format!(
                "invalid element name {:?} at {}",
                node.name(),
                node.id()
            )));
        }
        if let Some(name) = node.attributes().keys().find(|name| !is_valid_name(name)) {
            return Err(Error::Serialize(format!(
                "invalid attribute name {:?} at {}",
                name,
                node.id()
            )));
        }
        stack.extend(node.children());
    }
    Ok(())
}

fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Converts special characters to XML entities.
fn to_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a tree to a string.
pub fn print_tree(tree: &EditTree, options: &PrintOptions) -> Result<String> {
    let mut output = Vec::new();
    XmlPrinter::new(&mut output, options.clone()).print(tree)?;
    String::from_utf8(output).map_err(|e| Error::Serialize(e.to_string()))
}
