//! Diff engine for flat mappings.
//!
//! Computes the classified set difference between two `FlatMapping`s. Every
//! key in the union of both mappings is visited once and classified with the
//! priority removed, added, changed; equal values produce no record.

mod record;

pub use record::{Change, DiffRecord, DiffReport, DiffStats, DiffStatus};

use rustc_hash::FxHashSet;

use crate::collate::locale_cmp;
use crate::flatten::FlatMapping;

/// Diffs two mappings. Records are sorted by key in locale-aware order.
pub fn diff(left: &FlatMapping, right: &FlatMapping) -> DiffReport {
    let keys: FxHashSet<&str> = left.keys().chain(right.keys()).collect();

    let mut stats = DiffStats::default();
    let mut differences = Vec::new();
    for key in keys {
        let change = match (left.get(key), right.get(key)) {
            (Some(l), None) => Change::Removed {
                left: l.to_string(),
            },
            (None, Some(r)) => Change::Added {
                right: r.to_string(),
            },
            (Some(l), Some(r)) if l != r => Change::Changed {
                left: l.to_string(),
                right: r.to_string(),
            },
            _ => continue,
        };
        let record = DiffRecord {
            key: key.to_string(),
            change,
        };
        stats.record(record.status());
        differences.push(record);
    }

    differences.sort_by(|a, b| locale_cmp(&a.key, &b.key));
    DiffReport { differences, stats }
}
