//! XML parser that builds document trees.
//!
//! This parser uses quick-xml's streaming API. Open elements live on an
//! explicit stack, so document depth never translates into call-stack depth.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::node::{XmlDocument, XmlElement, XmlNode};

/// XML parser that builds `XmlDocument` trees.
#[derive(Debug, Default)]
pub struct XmlParser {
    /// Open elements, innermost last.
    stack: Vec<XmlElement>,
    /// Completed top-level nodes.
    top_level: Vec<XmlNode>,
}

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses XML from a string.
    pub fn parse_str(mut self, xml: &str) -> Result<XmlDocument> {
        let mut reader = Reader::from_str(xml);
        // Text is kept verbatim; trimming happens when values are extracted
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => return Err(Error::parse(e.to_string(), reader.error_position() as u64)),
            };
            let position = reader.buffer_position() as u64;
            match event {
                Event::Start(ref e) => {
                    let element = parse_element(e, &reader, position)?;
                    if self.stack.is_empty() {
                        self.check_single_root(position)?;
                    }
                    self.stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = parse_element(e, &reader, position)?;
                    self.attach(XmlNode::Element(element), position)?;
                }
                Event::End(_) => {
                    // quick-xml has already verified that the end name matches
                    let element = self
                        .stack
                        .pop()
                        .ok_or_else(|| Error::parse("unexpected end tag", position))?;
                    self.attach(XmlNode::Element(element), position)?;
                }
                Event::Text(e) => {
                    let raw = std::str::from_utf8(&e)
                        .map_err(|e| Error::parse(e.to_string(), position))?;
                    let text = unescape(raw).map_err(|e| Error::parse(e.to_string(), position))?;
                    self.push_text(&text, position)?;
                }
                Event::GeneralRef(ref e) => {
                    let resolved = resolve_reference(e, position)?;
                    self.push_text(&resolved, position)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    match self.stack.last_mut() {
                        Some(parent) => parent.push_child(XmlNode::CData(text)),
                        None => return Err(Error::parse("CDATA outside root element", position)),
                    }
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                    // Comments, declarations and processing instructions carry no values
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(Error::parse(
                format!("unclosed element <{}>", open.name()),
                xml.len() as u64,
            ));
        }
        let document = XmlDocument::new(self.top_level);
        if document.root().is_none() {
            return Err(Error::parse("document has no root element", xml.len() as u64));
        }
        Ok(document)
    }

    /// Attaches a completed node to the innermost open element or the document.
    fn attach(&mut self, node: XmlNode, position: u64) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(node),
            None => {
                self.check_single_root(position)?;
                self.top_level.push(node);
            }
        }
        Ok(())
    }

    /// Fails if a root element has already been completed.
    fn check_single_root(&self, position: u64) -> Result<()> {
        if self.top_level.iter().any(|node| node.as_element().is_some()) {
            return Err(Error::parse("multiple root elements", position));
        }
        Ok(())
    }

    /// Appends character data, merging with a directly preceding text run.
    fn push_text(&mut self, text: &str, position: u64) -> Result<()> {
        let Some(parent) = self.stack.last_mut() else {
            // Only whitespace may surround the root element
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::parse("text outside root element", position));
        };
        if let Some(XmlNode::Text(existing)) = parent.children_mut().last_mut() {
            existing.push_str(text);
            return Ok(());
        }
        parent.push_child(XmlNode::Text(text.to_string()));
        Ok(())
    }
}

/// Parses an element's name and attributes.
fn parse_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>, position: u64) -> Result<XmlElement> {
    let name = reader
        .decoder()
        .decode(e.name().as_ref())
        .map_err(|e| Error::parse(e.to_string(), position))?
        .into_owned();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|e| Error::parse(format!("attribute error: {}", e), position))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|e| Error::parse(e.to_string(), position))?
            .into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::parse(e.to_string(), position))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement::new(name, attributes))
}

/// Resolves a character or predefined entity reference appearing in text.
fn resolve_reference(e: &BytesRef<'_>, position: u64) -> Result<Cow<'static, str>> {
    if let Some(ch) = e
        .resolve_char_ref()
        .map_err(|err| Error::parse(err.to_string(), position))?
    {
        return Ok(Cow::Owned(ch.to_string()));
    }
    let name = e
        .decode()
        .map_err(|err| Error::parse(err.to_string(), position))?;
    resolve_predefined_entity(&name)
        .map(Cow::Borrowed)
        .ok_or_else(|| Error::parse(format!("unknown entity &{};", name), position))
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<XmlDocument> {
    let xml = fs::read_to_string(path)?;
    parse_str(&xml)
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<XmlDocument> {
    XmlParser::new().parse_str(xml)
}
