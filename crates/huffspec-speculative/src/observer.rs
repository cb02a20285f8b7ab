//! Optional instrumentation hooks.
//!
//! Observers see every confirm/reject decision and step summary. They run on
//! the coordinating thread and never influence the decoded output.

use crate::hypothesis::Hypothesis;
use huffspec_core::Candidates;

/// Summary of one resolved scheduler step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEvent {
    /// Step index, from 0.
    pub step: u64,
    /// Frontier when the step began.
    pub frontier: usize,
    /// Frontier after all adopted runs.
    pub new_frontier: usize,
    /// Lengths the predictor proposed.
    pub candidates: Candidates,
    /// Decode units launched, ground truth included.
    pub units: usize,
    /// Codewords committed.
    pub committed: usize,
    /// Hypotheses confirmed.
    pub confirmed: usize,
    /// Hypotheses rejected.
    pub rejected: usize,
}

/// Hooks invoked by the scheduler.
pub trait DecodeObserver {
    /// A hypothesis matched the ground-truth boundary `frontier`.
    fn on_confirm(&mut self, _hypothesis: &Hypothesis, _frontier: usize) {}

    /// A hypothesis was discarded while the frontier stood at `frontier`.
    fn on_reject(&mut self, _hypothesis: &Hypothesis, _frontier: usize) {}

    /// A step finished.
    fn on_step(&mut self, _event: &StepEvent) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecodeObserver for NoopObserver {}

/// Observer that keeps every event, for tests and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Confirmed hypotheses with the boundary they were confirmed at.
    pub confirmations: Vec<(Hypothesis, usize)>,
    /// Rejected hypotheses with the frontier at rejection.
    pub rejections: Vec<(Hypothesis, usize)>,
    /// Step summaries in order.
    pub steps: Vec<StepEvent>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecodeObserver for RecordingObserver {
    fn on_confirm(&mut self, hypothesis: &Hypothesis, frontier: usize) {
        self.confirmations.push((hypothesis.clone(), frontier));
    }

    fn on_reject(&mut self, hypothesis: &Hypothesis, frontier: usize) {
        self.rejections.push((hypothesis.clone(), frontier));
    }

    fn on_step(&mut self, event: &StepEvent) {
        self.steps.push(event.clone());
    }
}
