//! Constants used throughout xml-flatdiff.

/// Maximum number of elements processed between two progress reports.
pub const PROGRESS_INTERVAL: usize = 250;

/// Highest percentage reported while a flattening is still running.
pub const PROGRESS_CEILING: u8 = 99;

/// Number of snapshots retained by the editor history, the current one included.
pub const HISTORY_CAPACITY: usize = 50;

/// Overall progress span `(start, end)` occupied by flattening the left document.
pub const LEFT_SPAN: (u8, u8) = (0, 45);

/// Overall progress span occupied by flattening the right document.
pub const RIGHT_SPAN: (u8, u8) = (45, 90);

/// Overall progress span occupied by the diff itself.
pub const DIFF_SPAN: (u8, u8) = (90, 100);

/// Separator between path segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Marker joining an element path to an attribute name.
pub const ATTR_MARKER: &str = "/@";

/// Suffix addressing the text content of an element.
pub const TEXT_SUFFIX: &str = "/#text";
