//! Verifier / merger.
//!
//! Owns everything that mutates during a decode: canonical output, the
//! frontier, the prediction context, and the statistics. A run is adopted
//! only if it starts exactly at the frontier; prefix-freeness guarantees the
//! decode from a true boundary is unique, so no symbol-by-symbol check is
//! needed.

use crate::unit::SpeculativeRun;
use huffspec_core::{Context, DecodeThroughput, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Statistics of one speculative decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Scheduler steps.
    pub steps: u64,
    /// Decode units launched.
    pub tries: u64,
    /// Hypotheses confirmed.
    pub confirmed: u64,
    /// Hypotheses rejected.
    pub rejected: u64,
    /// Codewords committed.
    pub symbols: u64,
    /// Bits consumed.
    pub bits: u64,
    /// Steps whose ground-truth codeword length was among the candidates.
    pub truly_guessed: u64,
    /// Steps per number of codewords committed in the step.
    pub committed_histogram: BTreeMap<usize, u64>,
    /// Wall time in microseconds.
    pub time_us: u64,
}

impl DecodeStats {
    /// Mean codewords committed per step (the realized decode rate).
    pub fn mean_committed(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.symbols as f64 / self.steps as f64
        }
    }

    /// Population standard deviation of codewords per step.
    pub fn std_committed(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        let mean = self.mean_committed();
        let variance = self
            .committed_histogram
            .iter()
            .map(|(&n, &count)| count as f64 * (n as f64 - mean).powi(2))
            .sum::<f64>()
            / self.steps as f64;
        variance.sqrt()
    }

    /// Fewest codewords committed in a step.
    pub fn min_committed(&self) -> usize {
        self.committed_histogram.keys().next().copied().unwrap_or(0)
    }

    /// Most codewords committed in a step.
    pub fn max_committed(&self) -> usize {
        self.committed_histogram
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    /// Committed codewords per launched unit.
    pub fn efficiency(&self) -> f64 {
        if self.tries == 0 {
            0.0
        } else {
            self.symbols as f64 / self.tries as f64
        }
    }

    /// Fraction of steps where the true length was predicted.
    pub fn truly_guessed_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.truly_guessed as f64 / self.steps as f64
        }
    }

    /// Fraction of hypotheses that were confirmed.
    pub fn confirmation_rate(&self) -> f64 {
        let total = self.confirmed + self.rejected;
        if total == 0 {
            0.0
        } else {
            self.confirmed as f64 / total as f64
        }
    }

    /// Throughput summary for aggregate metrics.
    pub fn throughput(&self) -> DecodeThroughput {
        DecodeThroughput::new(self.symbols, self.bits, self.steps, self.time_us)
    }
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} symbols in {} steps (rate {:.4}, min {}, max {}, std {:.4}), \
             {} tries, efficiency {:.4}, {}/{} hypotheses confirmed",
            self.symbols,
            self.steps,
            self.mean_committed(),
            self.min_committed(),
            self.max_committed(),
            self.std_committed(),
            self.tries,
            self.efficiency(),
            self.confirmed,
            self.confirmed + self.rejected
        )
    }
}

/// Canonical output of a speculative decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutput {
    /// Decoded symbols.
    pub symbols: Vec<Symbol>,
    /// Decode statistics.
    pub stats: DecodeStats,
}

impl DecodeOutput {
    /// Correctness flag against the original input.
    pub fn matches(&self, original: &[Symbol]) -> bool {
        self.symbols == original
    }
}

/// Single-writer owner of output, frontier and context.
#[derive(Debug)]
pub struct Merger {
    output: Vec<Symbol>,
    frontier: usize,
    context: Context,
    stats: DecodeStats,
    step_committed: usize,
    step_confirmed: usize,
    step_rejected: usize,
}

impl Merger {
    /// Start at frontier 0 with the predictor's initial context.
    pub fn new(context: Context, capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            frontier: 0,
            context,
            stats: DecodeStats::default(),
            step_committed: 0,
            step_confirmed: 0,
            step_rejected: 0,
        }
    }

    /// Decode frontier.
    pub fn frontier(&self) -> usize {
        self.frontier
    }

    /// Lengths of the most recently committed codewords.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Canonical output so far.
    pub fn output(&self) -> &[Symbol] {
        &self.output
    }

    /// Codewords committed in the current step.
    pub fn step_committed(&self) -> usize {
        self.step_committed
    }

    /// Append `run` if it starts exactly at the frontier.
    ///
    /// Returns whether the run was adopted. Empty runs are never adopted.
    pub fn adopt(&mut self, run: &SpeculativeRun) -> bool {
        if run.start() != self.frontier || run.is_empty() {
            return false;
        }

        for &(symbol, length) in run.symbols() {
            self.output.push(symbol);
            self.context.push(length);
        }
        self.frontier = run.end();
        self.step_committed += run.len();
        true
    }

    /// Count a confirmed hypothesis.
    pub fn record_confirm(&mut self) {
        self.step_confirmed += 1;
    }

    /// Count a rejected hypothesis.
    pub fn record_reject(&mut self) {
        self.step_rejected += 1;
    }

    /// Close the current step.
    ///
    /// Returns (committed, confirmed, rejected) for the step.
    pub fn end_step(
        &mut self,
        frontier_before: usize,
        units: usize,
        truly_guessed: bool,
    ) -> (usize, usize, usize) {
        let summary = (self.step_committed, self.step_confirmed, self.step_rejected);

        self.stats.steps += 1;
        self.stats.tries += units as u64;
        self.stats.confirmed += self.step_confirmed as u64;
        self.stats.rejected += self.step_rejected as u64;
        self.stats.symbols += self.step_committed as u64;
        self.stats.bits += (self.frontier - frontier_before) as u64;
        self.stats.truly_guessed += truly_guessed as u64;
        *self
            .stats
            .committed_histogram
            .entry(self.step_committed)
            .or_insert(0) += 1;

        self.step_committed = 0;
        self.step_confirmed = 0;
        self.step_rejected = 0;
        summary
    }

    /// Hand over the output.
    pub fn finish(mut self, elapsed: Duration) -> DecodeOutput {
        self.stats.time_us = elapsed.as_micros() as u64;
        DecodeOutput {
            symbols: self.output,
            stats: self.stats,
        }
    }
}
