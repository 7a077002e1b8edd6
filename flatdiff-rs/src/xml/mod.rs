//! XML parsing and output.
//!
//! Parsing turns raw text into the `XmlDocument` model consumed by the
//! flattener. Printing writes an `EditTree` back out as a document.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str, XmlParser};
pub use printer::{print_tree, PrintOptions, XmlPrinter};

/// Returns true if `name` is usable as an element or attribute name.
///
/// Accepts the XML `Name` production restricted to what the printer can
/// emit unescaped: a letter, `_` or `:` followed by letters, digits, `-`,
/// `.`, `_` or `:`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_' || first == ':') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}
