//! Comparison requests.
//!
//! A comparison takes two XML texts, flattens each, and diffs the results.
//! The caller observes an ordered stream of progress events followed by
//! exactly one terminal event. Overall progress is split into fixed spans:
//! left document 0-45%, right document 45-90%, diff 90-100%.
//!
//! [`run`] executes on the calling thread; [`spawn`] moves the same work onto
//! a dedicated worker thread and streams events over a channel.

mod worker;

pub use worker::{spawn, ComparisonHandle};

use std::fmt;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::constants::{DIFF_SPAN, LEFT_SPAN, RIGHT_SPAN};
use crate::diff::{diff, DiffReport};
use crate::error::Result;
use crate::flatten::{flatten_str, FlatMapping};

/// The two documents to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub left_xml: String,
    pub right_xml: String,
}

impl CompareRequest {
    pub fn new(left_xml: impl Into<String>, right_xml: impl Into<String>) -> Self {
        CompareRequest {
            left_xml: left_xml.into(),
            right_xml: right_xml.into(),
        }
    }
}

/// Stage of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Left,
    Right,
    Diff,
}

impl Phase {
    /// Overall progress span `(start, end)` this phase occupies.
    pub fn span(self) -> (u8, u8) {
        match self {
            Phase::Left => LEFT_SPAN,
            Phase::Right => RIGHT_SPAN,
            Phase::Diff => DIFF_SPAN,
        }
    }

    /// Maps a phase-local percentage onto overall progress.
    pub fn overall(self, local: u8) -> u8 {
        let (start, end) = self.span();
        let local = u32::from(local.min(100));
        let width = u32::from(end - start);
        start + (width * local / 100) as u8
    }

    fn message(self) -> &'static str {
        match self {
            Phase::Left => "Flattening left document",
            Phase::Right => "Flattening right document",
            Phase::Diff => "Computing differences",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Left => "left",
            Phase::Right => "right",
            Phase::Diff => "diff",
        })
    }
}

/// A progress notification. `percent` is overall progress in `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub percent: u8,
    pub message: String,
}

/// Per-side failure report. At least one side is set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_failure(.left_error, .right_error))]
pub struct CompareFailure {
    pub left_error: Option<String>,
    pub right_error: Option<String>,
}

fn describe_failure(left: &Option<String>, right: &Option<String>) -> String {
    match (left, right) {
        (Some(l), Some(r)) => format!("left document: {}; right document: {}", l, r),
        (Some(l), None) => format!("left document: {}", l),
        (None, Some(r)) => format!("right document: {}", r),
        (None, None) => "comparison failed".to_string(),
    }
}

/// Events emitted by a comparison, terminated by `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareEvent {
    Progress(ProgressEvent),
    Completed(DiffReport),
    Failed(CompareFailure),
}

impl CompareEvent {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CompareEvent::Progress(_))
    }
}

/// Runs a comparison on the current thread.
///
/// Both documents are always parsed, so a failure on one side does not hide
/// an error on the other. The diff is skipped if either side failed.
#[instrument(skip_all, fields(left_bytes = request.left_xml.len(), right_bytes = request.right_xml.len()))]
pub fn run(
    request: &CompareRequest,
    on_progress: &mut dyn FnMut(ProgressEvent),
) -> std::result::Result<DiffReport, CompareFailure> {
    let left = flatten_side(Phase::Left, &request.left_xml, on_progress);
    let right = flatten_side(Phase::Right, &request.right_xml, on_progress);

    let (left, right) = match (left, right) {
        (Ok(left), Ok(right)) => (left, right),
        (left, right) => {
            let failure = CompareFailure {
                left_error: left.err().map(|e| e.to_string()),
                right_error: right.err().map(|e| e.to_string()),
            };
            warn!(%failure, "comparison failed");
            return Err(failure);
        }
    };

    emit(on_progress, Phase::Diff, 0, Phase::Diff.message());
    let report = diff(&left, &right);
    emit(on_progress, Phase::Diff, 100, "Comparison complete");

    info!(
        added = report.stats.added,
        removed = report.stats.removed,
        changed = report.stats.changed,
        "comparison complete"
    );
    Ok(report)
}

fn flatten_side(
    phase: Phase,
    xml: &str,
    on_progress: &mut dyn FnMut(ProgressEvent),
) -> Result<FlatMapping> {
    let mut last = None;
    let mut sink = |local: u8| {
        let percent = phase.overall(local);
        if last != Some(percent) {
            last = Some(percent);
            emit(on_progress, phase, local, phase.message());
        }
    };
    flatten_str(xml, &mut sink)
}

fn emit(on_progress: &mut dyn FnMut(ProgressEvent), phase: Phase, local: u8, message: &str) {
    on_progress(ProgressEvent {
        phase,
        percent: phase.overall(local),
        message: message.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffStatus;

    type Outcome = std::result::Result<DiffReport, CompareFailure>;

    fn collect(request: &CompareRequest) -> (Vec<ProgressEvent>, Outcome) {
        let mut events = Vec::new();
        let result = run(request, &mut |e| events.push(e));
        (events, result)
    }

    #[test]
    fn test_phase_spans() {
        assert_eq!(Phase::Left.overall(0), 0);
        assert_eq!(Phase::Left.overall(100), 45);
        assert_eq!(Phase::Right.overall(0), 45);
        assert_eq!(Phase::Right.overall(100), 90);
        assert_eq!(Phase::Diff.overall(50), 95);
        assert_eq!(Phase::Diff.overall(100), 100);
    }

    #[test]
    fn test_successful_comparison() {
        let request = CompareRequest::new("<a><b>1</b></a>", "<a><b>2</b></a>");
        let (events, result) = collect(&request);
        let report = result.unwrap();
        assert_eq!(report.stats.changed, 1);
        assert_eq!(report.differences[0].status(), DiffStatus::Changed);

        assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(events.first().map(|e| e.phase), Some(Phase::Left));
        assert_eq!(events.last().map(|e| e.percent), Some(100));
        assert!(events.iter().any(|e| e.phase == Phase::Right));
    }

    #[test]
    fn test_both_sides_report_errors() {
        let request = CompareRequest::new("<a>", "<b></c>");
        let (events, result) = collect(&request);
        let failure = result.unwrap_err();
        assert!(failure.left_error.is_some());
        assert!(failure.right_error.is_some());
        assert!(events.iter().all(|e| e.phase != Phase::Diff));
    }

    #[test]
    fn test_one_side_failure_skips_diff() {
        let request = CompareRequest::new("<a/>", "not xml <");
        let (events, result) = collect(&request);
        let failure = result.unwrap_err();
        assert!(failure.left_error.is_none());
        assert!(failure.to_string().starts_with("right document"));
        assert!(events.iter().all(|e| e.phase != Phase::Diff));
    }
}
