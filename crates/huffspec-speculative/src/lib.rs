//! Speculative-Parallel Prefix Decoding
//!
//! This crate breaks the serial dependency of prefix-code decoding:
//! - Length prediction (context-free, order-k context-aware, baseline)
//! - Concurrent decode units at guessed codeword boundaries
//! - Verification against the authoritative boundary before adoption
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Speculative Decoder                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  CodeTable ──> LengthPredictor ──> Scheduler ──> Merger     │
//! │  (lengths)     (candidates at F)   (units)      (output)    │
//! │                                                             │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │  F=120   ground truth @120  ──> len 3  ──> F=123      │  │
//! │  │          hypothesis   @123  ──> Confirmed, F=127      │  │
//! │  │          hypothesis   @124  ──> Rejected              │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use huffspec_huffman::{CodeTable, SymbolStats};
//! use huffspec_speculative::{
//!     ContextFreePredictor, ExactLengths, LengthDistribution, SpeculationConfig,
//!     SpeculativeDecoder,
//! };
//!
//! let data: Vec<u32> = b"abracadabra".iter().map(|&b| b as u32).collect();
//! let table = CodeTable::build(&SymbolStats::from_symbols(&data)).unwrap();
//! let bits = table.encode(&data).unwrap();
//!
//! let lengths = table.code_lengths_of(&data).unwrap();
//! let distribution = LengthDistribution::from_source(&ExactLengths::new(&lengths)).unwrap();
//! let predictor = ContextFreePredictor::new(&distribution, 2).unwrap();
//!
//! let decoder = SpeculativeDecoder::new(&table, &predictor, SpeculationConfig::new(2)).unwrap();
//! let output = decoder.decode(&bits).unwrap();
//! assert!(output.matches(&data));
//! ```

mod config;
mod distribution;
mod hypothesis;
mod kgram;
mod merger;
mod observer;
mod optimizer;
mod predictor;
mod scheduler;
mod theory;
mod unit;

pub use config::{Horizon, SpeculationConfig, VectorSelection};
pub use distribution::{EstimatedLengths, ExactLengths, LengthDistribution, LengthSource};
pub use hypothesis::{capped_lengths, propose, Hypothesis, HypothesisState};
pub use kgram::{ConditionalScheme, Gram, KGramModel};
pub use merger::{DecodeOutput, DecodeStats, Merger};
pub use observer::{DecodeObserver, NoopObserver, RecordingObserver, StepEvent};
pub use optimizer::{combinations, ScoredVector, VectorOptimizer};
pub use predictor::{
    baseline_set, ContextAwarePredictor, ContextFreePredictor, PositionRestrictedPredictor,
};
pub use scheduler::SpeculativeDecoder;
pub use theory::{ConditionalRate, ContextFreeRate};
pub use unit::{DecodeUnit, SpeculativeRun};

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        ContextAwarePredictor, ContextFreePredictor, DecodeOutput, LengthDistribution,
        PositionRestrictedPredictor, SpeculationConfig, SpeculativeDecoder,
    };
}
