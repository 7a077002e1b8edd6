//! Worker-thread comparisons.

use std::any::Any;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::{run, CompareEvent, CompareFailure, CompareRequest, ProgressEvent};
use crate::diff::DiffReport;
use crate::error::{Error, Result};

/// Receiving end of a comparison running on a worker thread.
///
/// Iterating yields progress events in order and then exactly one terminal
/// event. Dropping the handle abandons the request: the worker keeps no
/// shared state and exits once its work is done.
#[derive(Debug)]
pub struct ComparisonHandle {
    receiver: Receiver<CompareEvent>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

/// Starts a comparison on a new worker thread.
pub fn spawn(request: CompareRequest) -> Result<ComparisonHandle> {
    spawn_with(request, run)
}

/// Outcome of the work a comparison thread runs.
pub(crate) type Outcome = std::result::Result<DiffReport, CompareFailure>;

/// Runs `work` on a new worker thread, forwarding its progress and outcome.
pub(crate) fn spawn_with<F>(request: CompareRequest, work: F) -> Result<ComparisonHandle>
where
    F: FnOnce(&CompareRequest, &mut dyn FnMut(ProgressEvent)) -> Outcome + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let worker = thread::Builder::new()
        .name("fdiff-compare".to_string())
        .spawn(move || {
            let mut forward = |event: ProgressEvent| {
                // A closed channel means the caller stopped listening
                let _ = sender.send(CompareEvent::Progress(event));
            };
            let terminal = match work(&request, &mut forward) {
                Ok(report) => CompareEvent::Completed(report),
                Err(failure) => CompareEvent::Failed(failure),
            };
            if sender.send(terminal).is_err() {
                debug!("comparison result discarded; receiver dropped");
            }
        })?;

    Ok(ComparisonHandle {
        receiver,
        worker: Some(worker),
        finished: false,
    })
}

impl ComparisonHandle {
    /// Blocks for the next event. Returns `None` after the terminal event.
    pub fn next_event(&mut self) -> Option<CompareEvent> {
        if self.finished {
            return None;
        }
        match self.receiver.recv() {
            Ok(event) => {
                if event.is_terminal() {
                    self.finished = true;
                    self.join();
                }
                Some(event)
            }
            Err(_) => {
                // The worker hung up without a terminal event
                self.finished = true;
                let reason = self
                    .join()
                    .unwrap_or_else(|| "worker exited without a result".to_string());
                let error = Error::Worker(reason);
                warn!(%error, "comparison worker failed");
                Some(CompareEvent::Failed(CompareFailure {
                    left_error: Some(error.to_string()),
                    right_error: None,
                }))
            }
        }
    }

    /// Drains all progress events and returns the terminal outcome.
    pub fn wait(mut self) -> std::result::Result<DiffReport, CompareFailure> {
        while let Some(event) = self.next_event() {
            match event {
                CompareEvent::Progress(_) => continue,
                CompareEvent::Completed(report) => return Ok(report),
                CompareEvent::Failed(failure) => return Err(failure),
            }
        }
        Err(CompareFailure {
            left_error: Some(Error::Worker("no result received".to_string()).to_string()),
            right_error: None,
        })
    }

    /// Joins the worker, returning its panic message if it panicked.
    fn join(&mut self) -> Option<String> {
        let worker = self.worker.take()?;
        worker.join().err().map(panic_message)
    }
}

impl Iterator for ComparisonHandle {
    type Item = CompareEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Phase;

    #[test]
    fn test_stream_ends_with_single_terminal_event() {
        let handle = spawn(CompareRequest::new("<a x=\"1\"/>", "<a x=\"2\"/>")).unwrap();
        let events: Vec<CompareEvent> = handle.collect();

        let terminal: Vec<&CompareEvent> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert!(events.last().unwrap().is_terminal());
        match events.last() {
            Some(CompareEvent::Completed(report)) => assert_eq!(report.stats.changed, 1),
            other => panic!("unexpected terminal event {other:?}"),
        }
    }

    #[test]
    fn test_progress_precedes_terminal_in_order() {
        let handle = spawn(CompareRequest::new("<a/>", "<a/>")).unwrap();
        let mut last_percent = 0;
        let mut saw_diff = false;
        for event in handle {
            if let CompareEvent::Progress(p) = event {
                assert!(p.percent >= last_percent);
                last_percent = p.percent;
                saw_diff |= p.phase == Phase::Diff;
            }
        }
        assert!(saw_diff);
        assert_eq!(last_percent, 100);
    }

    #[test]
    fn test_wait_reports_failure() {
        let handle = spawn(CompareRequest::new("<a>", "<a/>")).unwrap();
        let failure = handle.wait().unwrap_err();
        assert!(failure.left_error.is_some());
        assert!(failure.right_error.is_none());
    }

    #[test]
    fn test_worker_panic_becomes_left_failure() {
        let handle = spawn_with(CompareRequest::new("<a/>", "<a/>"), |_, on_progress| {
            on_progress(ProgressEvent {
                phase: Phase::Left,
                percent: 0,
                message: "starting".to_string(),
            });
            panic!("flattener exploded")
        })
        .unwrap();
        let events: Vec<CompareEvent> = handle.collect();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CompareEvent::Progress(_)));
        match &events[1] {
            CompareEvent::Failed(failure) => {
                let left = failure.left_error.as_deref().unwrap();
                assert!(left.contains("worker panicked"), "{left}");
                assert!(left.contains("flattener exploded"), "{left}");
                assert_eq!(failure.right_error, None);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_deep_documents_on_worker() {
        let depth = 100_000;
        let nest = |leaf: &str| format!("{}{}{}", "<n>".repeat(depth), leaf, "</n>".repeat(depth));
        let report = spawn(CompareRequest::new(nest("1"), nest("2")))
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(report.stats.changed, 1);
        assert!(report.differences[0].key.ends_with("n[1]/#text"));
    }

    #[test]
    fn test_dropping_handle_does_not_block() {
        let handle = spawn(CompareRequest::new("<a/>", "<b/>")).unwrap();
        drop(handle);
    }
}
