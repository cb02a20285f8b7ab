//! # Huffspec
//!
//! Speculative-parallel decoding of Huffman-coded streams.
//!
//! Decoding a prefix code is serial: the start of codeword n+1 is only known
//! once codeword n has been decoded. Huffspec predicts the length of the
//! codeword at the decode frontier, starts extra decode units at the guessed
//! boundaries, and keeps the work of those whose guess turns out true. The
//! output is always identical to sequential decoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffspec::{Simulation, SpeculationConfig};
//!
//! let data: Vec<u32> = b"she sells sea shells by the sea shore"
//!     .iter()
//!     .map(|&b| b as u32)
//!     .collect();
//!
//! let report = Simulation::new(SpeculationConfig::new(2))?.run(&data)?;
//! assert!(report.correct);
//! assert!(report.decode_rate >= 1.0);
//! # Ok::<(), huffspec::Error>(())
//! ```
//!
//! ## Predictors
//!
//! | Predictor | Config | Candidates |
//! |-----------|--------|------------|
//! | Context-free | default | top-w lengths by mass, or best w-subset |
//! | Context-aware | `with_model_order(k)` | top-w given the last k lengths |
//! | Position-restricted | `with_baseline(true)` | smallest sums of code lengths |
//!
//! ## Feature Flags
//!
//! - `parallel` - run decode units on the rayon pool (default)
//!
//! ## Crates
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        huffspec                          │
//! │                 (Simulation, re-exports)                 │
//! ├──────────────────────────────────────────────────────────┤
//! │  huffspec-speculative   predictors, theory, scheduler    │
//! │  huffspec-huffman       CodeTable build/encode/decode    │
//! │  huffspec-core          Bitstream, traits, errors        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod simulation;
pub use simulation::{check_input, Simulation, SimulationReport, DEFAULT_SYMBOL_BITS};

// Core types
pub use huffspec_core::{
    BitWriter, Bitstream, Candidates, CompressionRatio, Context, DecodeThroughput, Error,
    LengthPredictor, Metrics, PrefixDecoder, Result, Symbol,
};

// Code model
pub use huffspec_huffman::{
    build, huffman_code_lengths, CodeTable, SymbolStats, MAX_CODE_LENGTH, PROBABILITY_TOLERANCE,
};

// Speculation
pub use huffspec_speculative::{
    baseline_set, capped_lengths, combinations, propose, ConditionalRate, ConditionalScheme,
    ContextAwarePredictor, ContextFreePredictor, ContextFreeRate, DecodeObserver, DecodeOutput,
    DecodeStats, DecodeUnit, EstimatedLengths, ExactLengths, Gram, Horizon, Hypothesis,
    HypothesisState, KGramModel, LengthDistribution, LengthSource, Merger, NoopObserver,
    PositionRestrictedPredictor, RecordingObserver, ScoredVector, SpeculationConfig,
    SpeculativeDecoder, SpeculativeRun, StepEvent, VectorOptimizer, VectorSelection,
};

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        CodeTable, ContextAwarePredictor, ContextFreePredictor, DecodeOutput, Error,
        LengthDistribution, LengthPredictor, PositionRestrictedPredictor, PrefixDecoder, Result,
        Simulation, SimulationReport, SpeculationConfig, SpeculativeDecoder, SymbolStats,
    };
}
