//! Difference record types.

use std::fmt;
use std::str::FromStr;

/// Classification of a difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffStatus {
    /// Present only on the right.
    Added,
    /// Present only on the left.
    Removed,
    /// Present on both sides with different values.
    Changed,
}

impl DiffStatus {
    /// Returns the lowercase label used in reports and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::Added => "added",
            DiffStatus::Removed => "removed",
            DiffStatus::Changed => "changed",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(DiffStatus::Added),
            "removed" => Ok(DiffStatus::Removed),
            "changed" => Ok(DiffStatus::Changed),
            other => Err(format!("unknown status {:?}", other)),
        }
    }
}

/// The values involved in a difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Key only exists in the left mapping.
    Removed { left: String },
    /// Key only exists in the right mapping.
    Added { right: String },
    /// Key exists in both mappings with different values.
    Changed { left: String, right: String },
}

/// One classified difference at a flat-mapping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRecord {
    /// Canonical path plus `/@attr` or `/#text` suffix.
    pub key: String,
    /// What changed at `key`.
    pub change: Change,
}

impl DiffRecord {
    pub fn status(&self) -> DiffStatus {
        match self.change {
            Change::Removed { .. } => DiffStatus::Removed,
            Change::Added { .. } => DiffStatus::Added,
            Change::Changed { .. } => DiffStatus::Changed,
        }
    }

    pub fn left_value(&self) -> Option<&str> {
        match &self.change {
            Change::Removed { left } | Change::Changed { left, .. } => Some(left),
            Change::Added { .. } => None,
        }
    }

    pub fn right_value(&self) -> Option<&str> {
        match &self.change {
            Change::Added { right } | Change::Changed { right, .. } => Some(right),
            Change::Removed { .. } => None,
        }
    }

    /// Returns the record as seen from the other side: added and removed
    /// swap, and changed values trade places.
    pub fn mirrored(&self) -> DiffRecord {
        let change = match &self.change {
            Change::Removed { left } => Change::Added {
                right: left.clone(),
            },
            Change::Added { right } => Change::Removed {
                left: right.clone(),
            },
            Change::Changed { left, right } => Change::Changed {
                left: right.clone(),
                right: left.clone(),
            },
        };
        DiffRecord {
            key: self.key.clone(),
            change,
        }
    }
}

/// Exact counts of each classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DiffStats {
    pub(crate) fn record(&mut self, status: DiffStatus) {
        match status {
            DiffStatus::Added => self.added += 1,
            DiffStatus::Removed => self.removed += 1,
            DiffStatus::Changed => self.changed += 1,
        }
    }

    /// Total number of differences.
    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

/// Sorted differences plus their aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub differences: Vec<DiffRecord>,
    pub stats: DiffStats,
}

impl DiffReport {
    /// Returns true when the two mappings were identical.
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// Iterates over records of one classification. The stats are unaffected.
    pub fn filtered(&self, status: DiffStatus) -> impl Iterator<Item = &DiffRecord> {
        self.differences
            .iter()
            .filter(move |record| record.status() == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_labels() {
        for status in [DiffStatus::Added, DiffStatus::Removed, DiffStatus::Changed] {
            assert_eq!(status.as_str().parse::<DiffStatus>(), Ok(status));
        }
        assert!("moved".parse::<DiffStatus>().is_err());
    }

    #[test]
    fn test_mirrored_changed_swaps_values() {
        let record = DiffRecord {
            key: "a[1]/#text".to_string(),
            change: Change::Changed {
                left: "1".to_string(),
                right: "2".to_string(),
            },
        };
        let mirrored = record.mirrored();
        assert_eq!(mirrored.left_value(), Some("2"));
        assert_eq!(mirrored.right_value(), Some("1"));
        assert_eq!(mirrored.mirrored(), record);
    }

    #[test]
    fn test_values_by_side() {
        let removed = DiffRecord {
            key: "k".to_string(),
            change: Change::Removed {
                left: "x".to_string(),
            },
        };
        assert_eq!(removed.status(), DiffStatus::Removed);
        assert_eq!(removed.left_value(), Some("x"));
        assert_eq!(removed.right_value(), None);
    }
}
