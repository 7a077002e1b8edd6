//! Progress reporting for the flattener.
//!
//! The flattener cannot know the element count without a pre-scan, so it
//! estimates completion as `processed / (processed + pending + 1)`, where
//! `pending` is the number of discovered elements not yet visited. The
//! figure is a heuristic: it only promises to be non-decreasing, to stay in
//! `0..=99` while work remains, and to reach exactly 100 on completion.

use crate::constants::{PROGRESS_CEILING, PROGRESS_INTERVAL};

/// Receiver of completion percentages in `0..=100`.
pub trait ProgressSink {
    /// Called with the current completion percentage.
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Tunables for a flattening run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Maximum number of elements processed between two progress reports.
    pub progress_interval: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

/// Tracks processed elements and emits monotonic progress estimates.
#[derive(Debug)]
pub(crate) struct ProgressEstimator {
    processed: usize,
    interval: usize,
    last: u8,
}

impl ProgressEstimator {
    pub(crate) fn new(options: FlattenOptions) -> Self {
        ProgressEstimator {
            processed: 0,
            interval: options.progress_interval.max(1),
            last: 0,
        }
    }

    /// Emits the opening 0% report.
    pub(crate) fn start(&mut self, sink: &mut dyn ProgressSink) {
        sink.report(0);
    }

    /// Records one processed element; reports every `interval` elements.
    pub(crate) fn tick(&mut self, pending: usize, sink: &mut dyn ProgressSink) {
        self.processed += 1;
        if self.processed % self.interval != 0 {
            return;
        }
        let estimate = estimate(self.processed, pending);
        // A growing work stack can lower the estimate; hold the previous value instead
        self.last = self.last.max(estimate);
        sink.report(self.last);
    }

    /// Emits the final 100% report.
    pub(crate) fn finish(&mut self, sink: &mut dyn ProgressSink) {
        self.last = 100;
        sink.report(100);
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed
    }
}

/// Completion estimate in percent, clamped to `0..=PROGRESS_CEILING`.
fn estimate(processed: usize, pending: usize) -> u8 {
    let total = processed.saturating_add(pending).saturating_add(1);
    let percent = processed.saturating_mul(100) / total;
    percent.min(PROGRESS_CEILING as usize) as u8
}
