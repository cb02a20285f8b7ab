//! Hypotheses: guessed codeword boundaries ahead of the frontier.

use huffspec_core::{Candidates, Error, Result};
use serde::{Deserialize, Serialize};

/// Lifecycle of a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HypothesisState {
    /// Emitted by the predictor, no unit scheduled yet.
    Proposed,
    /// A decode unit is working from its offset.
    Running,
    /// Offset matched the ground-truth boundary; run adopted.
    Confirmed,
    /// Discarded; its run never reaches the output.
    Rejected,
}

impl HypothesisState {
    /// Check if the hypothesis reached a final state.
    pub fn is_resolved(&self) -> bool {
        matches!(self, HypothesisState::Confirmed | HypothesisState::Rejected)
    }
}

/// A guessed codeword boundary at `frontier + length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
    offset: usize,
    length: u32,
    state: HypothesisState,
}

impl Hypothesis {
    /// Propose a boundary `length` bits past `frontier`.
    pub fn new(frontier: usize, length: u32) -> Self {
        Self {
            offset: frontier + length as usize,
            length,
            state: HypothesisState::Proposed,
        }
    }

    /// Absolute bit offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Candidate length it came from.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Current state.
    pub fn state(&self) -> HypothesisState {
        self.state
    }

    /// Proposed -> Running.
    pub fn start(&mut self) {
        debug_assert_eq!(self.state, HypothesisState::Proposed);
        self.state = HypothesisState::Running;
    }

    /// Running -> Confirmed.
    pub fn confirm(&mut self) {
        debug_assert_eq!(self.state, HypothesisState::Running);
        self.state = HypothesisState::Confirmed;
    }

    /// Proposed or Running -> Rejected.
    pub fn reject(&mut self) {
        debug_assert!(!self.state.is_resolved());
        self.state = HypothesisState::Rejected;
    }
}

/// The lengths a step speculates on, in prediction order.
///
/// Lengths outside `1..=max_length` are dropped, repeats collapse to their
/// first occurrence, and at most `width` lengths are kept.
pub fn capped_lengths(candidates: &[u32], width: usize, max_length: u32) -> Candidates {
    let mut lengths = Candidates::new();
    for &length in candidates {
        if lengths.len() == width {
            break;
        }
        if length > 0 && length <= max_length && !lengths.contains(&length) {
            lengths.push(length);
        }
    }
    lengths
}

/// Turn predicted lengths into hypotheses.
///
/// Candidates are capped with [`capped_lengths`]. Offsets at or past
/// `stream_len` produce no hypothesis. The result is sorted by offset.
///
/// # Errors
/// `PredictionInconsistency` if no candidate length is usable.
pub fn propose(
    frontier: usize,
    candidates: &[u32],
    width: usize,
    max_length: u32,
    stream_len: usize,
) -> Result<Vec<Hypothesis>> {
    let lengths = capped_lengths(candidates, width, max_length);

    if lengths.is_empty() {
        return Err(Error::PredictionInconsistency { frontier });
    }

    let mut hypotheses: Vec<Hypothesis> = lengths
        .into_iter()
        .map(|length| Hypothesis::new(frontier, length))
        .filter(|h| h.offset() < stream_len)
        .collect();
    hypotheses.sort_by_key(Hypothesis::offset);

    Ok(hypotheses)
}
