//! Core type definitions shared by the code model and the decoder.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Atomic unit of the source alphabet (byte, pixel value, ...).
pub type Symbol = u32;

/// Candidate codeword lengths proposed by a predictor.
///
/// Lengths are bit distances from the decode frontier. Inline capacity
/// covers every speculation width used in practice.
pub type Candidates = SmallVec<[u32; 8]>;

/// Decoding history used to condition length predictions.
///
/// Holds the codeword lengths of the last `order` committed symbols, oldest
/// first. A context shorter than its order (stream start, tiny alphabets) is
/// valid but never matches a trained context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Context {
    order: usize,
    window: SmallVec<[u32; 8]>,
}

impl Context {
    /// Create an empty context of the given order.
    pub fn new(order: usize) -> Self {
        Context {
            order,
            window: SmallVec::new(),
        }
    }

    /// Create a context pre-filled with `seed` (oldest first).
    ///
    /// Only the last `order` entries of the seed are kept.
    pub fn with_seed(order: usize, seed: &[u32]) -> Self {
        let mut context = Context::new(order);
        for &length in seed {
            context.push(length);
        }
        context
    }

    /// Model order (k).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Append a committed codeword length, evicting the oldest entry.
    #[inline]
    pub fn push(&mut self, length: u32) {
        if self.order == 0 {
            return;
        }
        if self.window.len() == self.order {
            self.window.remove(0);
        }
        self.window.push(length);
    }

    /// Current window, oldest first.
    pub fn as_slice(&self) -> &[u32] {
        &self.window
    }

    /// Check if the window holds exactly `order` lengths.
    pub fn is_full(&self) -> bool {
        self.window.len() == self.order
    }
}

/// Compression ratio metrics, measured in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionRatio {
    /// Size of the source at its native symbol width, in bits.
    pub original_bits: u64,
    /// Size of the prefix-coded stream, in bits.
    pub compressed_bits: u64,
}

impl CompressionRatio {
    /// Create new ratio from bit counts.
    pub fn new(original_bits: u64, compressed_bits: u64) -> Self {
        CompressionRatio {
            original_bits,
            compressed_bits,
        }
    }

    /// Calculate ratio (original / compressed).
    /// Higher is better (more compression).
    pub fn ratio(&self) -> f64 {
        if self.compressed_bits == 0 {
            return 0.0;
        }
        self.original_bits as f64 / self.compressed_bits as f64
    }

    /// Compressed size rounded up to whole bytes.
    pub fn compressed_bytes(&self) -> u64 {
        self.compressed_bits.div_ceil(8)
    }

    /// Calculate space savings as percentage (0-100).
    pub fn savings_percent(&self) -> f64 {
        if self.original_bits == 0 {
            return 0.0;
        }
        (1.0 - (self.compressed_bits as f64 / self.original_bits as f64)) * 100.0
    }
}
