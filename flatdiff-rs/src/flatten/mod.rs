//! Path flattening of XML documents.
//!
//! Linearizes a parsed document into a `FlatMapping` from canonical keys to
//! scalar values:
//!
//! - `a[1].b[2]/@id` for every attribute of an element
//! - `a[1].b[2]/#text` for the trimmed direct text of an element, when
//!   non-empty
//!
//! Elements without attributes or text contribute no entry of their own.

mod progress;

pub use progress::{FlattenOptions, ProgressSink};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::collate::locale_cmp;
use crate::error::Result;
use crate::node::{XmlDocument, XmlNode};
use crate::path::{attr_key, push_segment, text_key, SiblingCounter};
use crate::xml::parse_str;

use progress::ProgressEstimator;

/// Flat mapping from canonical key to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatMapping {
    entries: FxHashMap<String, String>,
}

impl FlatMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Looks up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the entries sorted by key, in the same order the diff uses.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self.iter().collect();
        entries.sort_by(|a, b| locale_cmp(a.0, b.0));
        entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlatMapping {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Flattens a document with default options.
///
/// Progress is reported through `progress`; see [`ProgressSink`] for the
/// guarantees. The percentages are a heuristic estimate.
pub fn flatten(document: &XmlDocument, progress: &mut dyn ProgressSink) -> FlatMapping {
    flatten_with(document, FlattenOptions::default(), progress)
}

/// Parses and flattens `xml`. A parse failure yields no mapping at all.
pub fn flatten_str(xml: &str, progress: &mut dyn ProgressSink) -> Result<FlatMapping> {
    let document = parse_str(xml)?;
    Ok(flatten(&document, progress))
}

/// Flattens a document.
///
/// Traversal is depth-first in document order. Each open element is a frame
/// on an explicit stack and all frames share one path buffer, so call-stack
/// usage is independent of depth and path building is linear.
pub fn flatten_with(
    document: &XmlDocument,
    options: FlattenOptions,
    progress: &mut dyn ProgressSink,
) -> FlatMapping {
    let mut mapping = FlatMapping::new();
    let mut estimator = ProgressEstimator::new(options);
    let mut path = String::new();
    let mut pending = document.root_elements().count();
    let mut frames = vec![Frame::new(document.children(), 0)];

    estimator.start(progress);
    while let Some(frame) = frames.last_mut() {
        let Some(element) = frame.children.by_ref().find_map(XmlNode::as_element) else {
            path.truncate(frame.path_len);
            frames.pop();
            continue;
        };
        let index = frame.counter.next(element.name());
        let path_len = path.len();
        push_segment(&mut path, element.name(), index);

        for (name, value) in element.attributes() {
            mapping.insert(attr_key(&path, name), value.as_str());
        }
        let text = element.direct_text();
        if !text.is_empty() {
            mapping.insert(text_key(&path), text);
        }

        pending = pending - 1 + element.child_elements().count();
        frames.push(Frame::new(element.children(), path_len));
        estimator.tick(pending, progress);
    }

    estimator.finish(progress);
    debug!(
        elements = estimator.processed(),
        entries = mapping.len(),
        "flattened document"
    );
    mapping
}

/// An element whose children are being visited.
struct Frame<'a> {
    children: std::slice::Iter<'a, XmlNode>,
    /// Fresh per parent; counts never carry over between sibling lists.
    counter: SiblingCounter<'a>,
    /// Length of the shared path buffer before this element's segment.
    path_len: usize,
}

impl<'a> Frame<'a> {
    fn new(children: &'a [XmlNode], path_len: usize) -> Self {
        Frame {
            children: children.iter(),
            counter: SiblingCounter::new(),
            path_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(xml: &str) -> FlatMapping {
        flatten_str(xml, &mut |_: u8| {}).unwrap()
    }

    #[test]
    fn test_sibling_indices() {
        let m = flat("<a><b>1</b><c>x</c><b>2</b></a>");
        assert_eq!(m.get("a[1].b[1]/#text"), Some("1"));
        assert_eq!(m.get("a[1].b[2]/#text"), Some("2"));
        assert_eq!(m.get("a[1].c[1]/#text"), Some("x"));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_counters_reset_per_parent() {
        let m = flat("<r><p><v>1</v></p><p><v>2</v><v>3</v></p></r>");
        assert_eq!(m.get("r[1].p[1].v[1]/#text"), Some("1"));
        assert_eq!(m.get("r[1].p[2].v[1]/#text"), Some("2"));
        assert_eq!(m.get("r[1].p[2].v[2]/#text"), Some("3"));
    }

    #[test]
    fn test_attributes_and_text() {
        let m = flat(r#"<cfg version="2"><param name="gain" unit="dB"> 12 </param></cfg>"#);
        assert_eq!(m.get("cfg[1]/@version"), Some("2"));
        assert_eq!(m.get("cfg[1].param[1]/@name"), Some("gain"));
        assert_eq!(m.get("cfg[1].param[1]/@unit"), Some("dB"));
        assert_eq!(m.get("cfg[1].param[1]/#text"), Some("12"));
        assert!(!m.contains_key("cfg[1]/#text"));
    }

    #[test]
    fn test_text_ignores_nested_elements() {
        let m = flat("<a>head<b>inner</b>tail</a>");
        assert_eq!(m.get("a[1]/#text"), Some("headtail"));
        assert_eq!(m.get("a[1].b[1]/#text"), Some("inner"));
    }

    #[test]
    fn test_whitespace_only_text_is_omitted() {
        let m = flat("<a>   \n  <b/>  </a>");
        assert!(m.is_empty());
    }

    #[test]
    fn test_empty_elements_contribute_nothing() {
        let m = flat("<a><b/><c></c></a>");
        assert!(m.is_empty());
    }

    #[test]
    fn test_cdata_is_text() {
        let m = flat("<a><![CDATA[ <raw> ]]></a>");
        assert_eq!(m.get("a[1]/#text"), Some("<raw>"));
    }

    #[test]
    fn test_attribute_values_are_not_trimmed() {
        let m = flat(r#"<a v=" padded "/>"#);
        assert_eq!(m.get("a[1]/@v"), Some(" padded "));
    }

    #[test]
    fn test_parse_error_returns_no_mapping() {
        assert!(flatten_str("<a><b></a>", &mut |_: u8| {}).is_err());
    }

    #[test]
    fn test_deep_document() {
        let depth = 100_000;
        let xml = format!("{}x{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let m = flat(&xml);
        assert_eq!(m.len(), 1);
        let key = m.keys().next().unwrap();
        assert!(key.ends_with("n[1]/#text"));
        assert_eq!(key.matches("n[1]").count(), depth);
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let mut xml = String::from("<root>");
        for i in 0..1_000 {
            xml.push_str(&format!("<item id=\"{i}\"><v>{i}</v></item>"));
        }
        xml.push_str("</root>");

        let mut reports = Vec::new();
        let m = flatten_str(&xml, &mut |p: u8| reports.push(p)).unwrap();
        assert_eq!(m.len(), 2_000);
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reports.last(), Some(&100));
        assert!(reports[..reports.len() - 1].iter().all(|&p| p <= 99));
        // 2001 elements with an interval of 250 yield 8 intermediate reports
        assert_eq!(reports.len(), 10);
    }

    #[test]
    fn test_sorted_entries() {
        let m = flat("<a><b>2</b><b>1</b></a>");
        let keys: Vec<&str> = m.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a[1].b[1]/#text", "a[1].b[2]/#text"]);
    }
}
