//! # Huffspec Huffman
//!
//! Canonical Huffman code model for speculative decoding.
//!
//! The table is built once from symbol statistics and then shared read-only
//! by every decode unit. Decoding starts from any bit offset, which is what
//! lets speculative units begin at guessed codeword boundaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffspec_huffman::{CodeTable, SymbolStats};
//! use huffspec_core::PrefixDecoder;
//!
//! let data = [1, 1, 1, 2, 2, 3];
//! let table = CodeTable::build(&SymbolStats::from_symbols(&data)).unwrap();
//!
//! let bits = table.encode(&data).unwrap();
//! assert_eq!(table.decode_all(&bits).unwrap(), data);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              huffspec-huffman             │
//! ├───────────────────────────────────────────┤
//! │  stats.rs    SymbolStats (counts/p/len)   │
//! │  builder.rs  lowest-weight merge          │
//! │  table.rs    canonical CodeTable          │
//! │  encoder.rs  symbols -> Bitstream         │
//! │  decoder.rs  decode_one from any offset   │
//! └───────────────────────────────────────────┘
//! ```

mod builder;
mod decoder;
mod encoder;
mod stats;
mod table;

pub use builder::{build, huffman_code_lengths};
pub use stats::{SymbolStats, PROBABILITY_TOLERANCE};
pub use table::{CodeTable, MAX_CODE_LENGTH};
