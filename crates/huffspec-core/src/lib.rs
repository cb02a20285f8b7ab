//! # Huffspec Core
//!
//! Core traits, types, and errors for speculative prefix-code decoding.
//!
//! Prefix codes are inherently serial: a codeword's start is only known once
//! the previous codeword has been decoded. Huffspec breaks that dependency by
//! guessing future codeword boundaries, decoding from them in parallel, and
//! keeping only the work that lines up with the authoritative decode.
//!
//! ## Design Philosophy
//!
//! - **Read-only sharing**: code tables and bitstreams are immutable once built
//! - **Speculation never changes output**: guesses affect throughput only
//! - **Strategy seams**: predictors and code models sit behind traits
//!
//! ## Core Traits
//!
//! - [`PrefixDecoder`] - Single codeword decode from any bit offset
//! - [`LengthPredictor`] - Candidate codeword lengths at the decode frontier

pub mod bits;
pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use bits::{BitWriter, Bitstream};
pub use error::{Error, Result};
pub use stats::{DecodeThroughput, Metrics};
pub use traits::{LengthPredictor, PrefixDecoder};
pub use types::{Candidates, CompressionRatio, Context, Symbol};
