//! xml-flatdiff - flat-path comparison and editing of XML configuration documents
//!
//! This library compares two XML device-configuration documents by
//! linearizing each into a flat mapping of canonical paths to values and
//! diffing the mappings.
//!
//! # Overview
//!
//! A canonical path addresses an element by its ancestor chain, each step
//! written as `name[n]` where `n` is the 1-based occurrence of `name` among
//! the element children of one parent:
//!
//! ```text
//! <a><b>1</b><b id="x">2</b></a>
//!
//! a[1].b[1]/#text = 1
//! a[1].b[2]/@id   = x
//! a[1].b[2]/#text = 2
//! ```
//!
//! Differences are classified as added, removed or changed per key. An
//! element with neither attributes nor text produces no key, so adding or
//! removing an empty leaf element is not reported.
//!
//! # Key Features
//!
//! - Stack-bounded flattening with heuristic progress reporting
//! - Deterministic, locale-ordered diff output with exact counts
//! - Worker-thread comparisons streaming ordered progress events
//! - Copy-on-write editable trees sharing the same path scheme, with
//!   bounded undo history and XML/CSV output

pub mod collate;
pub mod compare;
pub mod constants;
pub mod diff;
pub mod editor;
pub mod error;
pub mod export;
pub mod flatten;
pub mod node;
pub mod path;
pub mod xml;

// Re-export commonly used types
pub use constants::*;
pub use error::{Error, Result};
pub use node::{XmlDocument, XmlElement, XmlNode};
pub use xml::{parse_file, parse_str, PrintOptions, XmlParser, XmlPrinter};

pub use flatten::{flatten, flatten_str, flatten_with, FlatMapping, FlattenOptions, ProgressSink};

pub use diff::{diff, Change, DiffRecord, DiffReport, DiffStats, DiffStatus};

pub use compare::{
    run as compare, spawn as spawn_compare, CompareEvent, CompareFailure, CompareRequest,
    ComparisonHandle, Phase, ProgressEvent,
};

pub use editor::{reindex, EditNode, EditTree, Editor, History};

pub use export::{to_csv_string, write_csv};
