//! Speculative scheduler.
//!
//! ## Step
//!
//! ```text
//!   F ──predict──> {l1, l2, ..}  ──>  hypotheses at F+l1 < F+l2 < ..
//!   │
//!   ├── ground-truth unit at F  ─┐
//!   ├── unit at F+l1             ├── run concurrently
//!   └── unit at F+l2             ┘
//!
//!   adopt ground truth: F -> F'
//!   for each hypothesis in offset order:
//!       offset == F'  -> Confirmed, adopt run, F' -> end of run
//!       otherwise     -> Rejected
//! ```
//!
//! The ground-truth unit always exists, so every step commits at least one
//! codeword even when no prediction is right. Confirmed hypotheses are the
//! speedup: a step commits as many codewords as the chain of matching
//! boundaries allows.
//!
//! Speculation only decides how much is committed per step. Every adopted
//! run starts exactly at the frontier, so the output equals the sequential
//! decode of the same stream.

use crate::config::SpeculationConfig;
use crate::hypothesis::{capped_lengths, propose, Hypothesis};
use crate::merger::{DecodeOutput, Merger};
use crate::observer::{DecodeObserver, NoopObserver, StepEvent};
use crate::unit::{DecodeUnit, SpeculativeRun};
use huffspec_core::{Bitstream, LengthPredictor, PrefixDecoder, Result};
use std::time::Instant;
use tracing::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Speculative-parallel decoder over a shared code model and predictor.
pub struct SpeculativeDecoder<'a, D: ?Sized, P: ?Sized> {
    decoder: &'a D,
    predictor: &'a P,
    config: SpeculationConfig,
}

impl<'a, D, P> SpeculativeDecoder<'a, D, P>
where
    D: PrefixDecoder + ?Sized,
    P: LengthPredictor + ?Sized,
{
    /// Create a decoder; the configuration is validated up front.
    pub fn new(decoder: &'a D, predictor: &'a P, config: SpeculationConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Speculative decoder: {} predictor, width {}, thread pool {}",
            predictor.name(),
            config.speculation_width,
            if config.uses_thread_pool() { "on" } else { "off" }
        );
        Ok(Self {
            decoder,
            predictor,
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SpeculationConfig {
        &self.config
    }

    /// Decode a whole stream.
    ///
    /// # Errors
    /// `MalformedBitstream` with the failing offset if the authoritative
    /// decode fails, `PredictionInconsistency` if the predictor offers no
    /// usable length.
    pub fn decode(&self, bits: &Bitstream) -> Result<DecodeOutput> {
        self.decode_with_observer(bits, &mut NoopObserver)
    }

    /// Decode a whole stream, reporting every decision to `observer`.
    pub fn decode_with_observer(
        &self,
        bits: &Bitstream,
        observer: &mut dyn DecodeObserver,
    ) -> Result<DecodeOutput> {
        let started = Instant::now();
        let stream_len = bits.len();
        let max_length = self.decoder.max_code_length() as u32;
        let chain_limit = self.config.chain_length_limit.unwrap_or(usize::MAX);

        // Every codeword is at most max_length bits, so this never over-reserves
        let min_symbols = stream_len / (max_length.max(1) as usize);
        let mut merger = Merger::new(self.predictor.initial_context(), min_symbols);
        let mut step = 0u64;

        while merger.frontier() < stream_len {
            let frontier = merger.frontier();
            let candidates = self.predictor.predict(frontier, merger.context());
            let mut hypotheses = propose(
                frontier,
                &candidates,
                self.config.speculation_width,
                max_length,
                stream_len,
            )?;

            let units = self.plan_units(frontier, &hypotheses, chain_limit);
            for hypothesis in &mut hypotheses {
                hypothesis.start();
            }

            // Index 0 is always the ground-truth unit
            let mut results = self.run_units(&units, bits);
            let truth = results.remove(0)?;

            let launched = capped_lengths(&candidates, self.config.speculation_width, max_length);
            let truly_guessed = truth
                .first_length()
                .is_some_and(|length| launched.contains(&length));
            merger.adopt(&truth);

            for (hypothesis, result) in hypotheses.iter_mut().zip(results) {
                self.resolve(hypothesis, result, &mut merger, chain_limit, observer);
            }

            let (committed, confirmed, rejected) =
                merger.end_step(frontier, units.len(), truly_guessed);

            trace!(
                "Step {}: frontier {} -> {}, {} committed, {} confirmed, {} rejected",
                step,
                frontier,
                merger.frontier(),
                committed,
                confirmed,
                rejected
            );

            observer.on_step(&StepEvent {
                step,
                frontier,
                new_frontier: merger.frontier(),
                candidates,
                units: units.len(),
                committed,
                confirmed,
                rejected,
            });
            step += 1;
        }

        let output = merger.finish(started.elapsed());
        info!(
            "Speculative decode ({}, w={}): {}",
            self.predictor.name(),
            self.config.speculation_width,
            output.stats
        );

        Ok(output)
    }

    /// Ground-truth unit first, then one unit per hypothesis.
    fn plan_units(
        &self,
        frontier: usize,
        hypotheses: &[Hypothesis],
        chain_limit: usize,
    ) -> Vec<DecodeUnit> {
        let horizon = self.config.horizon;
        let next_offset = |i: usize| {
            if horizon.stop_at_next_hypothesis {
                hypotheses.get(i).map(Hypothesis::offset)
            } else {
                None
            }
        };

        let mut units = Vec::with_capacity(hypotheses.len() + 1);
        units.push(
            DecodeUnit::new(frontier, horizon.max_symbols.min(chain_limit))
                .with_stop(next_offset(0)),
        );
        for (i, hypothesis) in hypotheses.iter().enumerate() {
            units.push(
                DecodeUnit::new(hypothesis.offset(), horizon.max_symbols)
                    .with_stop(next_offset(i + 1)),
            );
        }
        units
    }

    fn run_units(&self, units: &[DecodeUnit], bits: &Bitstream) -> Vec<Result<SpeculativeRun>> {
        let decoder = self.decoder;

        #[cfg(feature = "parallel")]
        {
            if units.len() >= self.config.parallel_threshold && units.len() > 1 {
                return units.par_iter().map(|unit| unit.run(decoder, bits)).collect();
            }
        }

        units.iter().map(|unit| unit.run(decoder, bits)).collect()
    }

    fn resolve(
        &self,
        hypothesis: &mut Hypothesis,
        result: Result<SpeculativeRun>,
        merger: &mut Merger,
        chain_limit: usize,
        observer: &mut dyn DecodeObserver,
    ) {
        let boundary = merger.frontier();

        match result {
            Ok(run)
                if hypothesis.offset() == boundary
                    && !run.is_empty()
                    && merger.step_committed() + run.len() <= chain_limit =>
            {
                hypothesis.confirm();
                observer.on_confirm(hypothesis, boundary);
                merger.adopt(&run);
                merger.record_confirm();
            }
            Ok(_) => {
                hypothesis.reject();
                observer.on_reject(hypothesis, boundary);
                merger.record_reject();
            }
            Err(e) => {
                trace!("Hypothesis at {} failed: {}", hypothesis.offset(), e);
                hypothesis.reject();
                observer.on_reject(hypothesis, boundary);
                merger.record_reject();
            }
        }
    }
}
