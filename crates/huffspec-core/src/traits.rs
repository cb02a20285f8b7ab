//! Core traits at the seams of the speculative decoder.
//!
//! ## Trait Map
//!
//! ```text
//! PrefixDecoder   (code model: one codeword from any bit offset)
//!       ↑
//! scheduler ──> LengthPredictor  (candidate codeword lengths at the frontier)
//! ```

use crate::bits::Bitstream;
use crate::error::Result;
use crate::types::{Candidates, Context, Symbol};

/// Single-step decoding of a prefix code.
///
/// Implementations must be immutable after construction: decode units call
/// into the same decoder from several threads without synchronization.
pub trait PrefixDecoder: Send + Sync {
    /// Decode one codeword starting at bit `offset`.
    ///
    /// # Returns
    /// Tuple of (symbol, offset just past the codeword).
    ///
    /// # Errors
    /// `Error::MalformedBitstream` if the stream ends before a leaf is
    /// reached.
    fn decode_one(&self, bits: &Bitstream, offset: usize) -> Result<(Symbol, usize)>;

    /// Longest codeword length in bits.
    fn max_code_length(&self) -> u8;

    /// Codeword length of `symbol`, if it belongs to the alphabet.
    fn code_length(&self, symbol: Symbol) -> Option<u8>;

    /// Reference sequential decode of a whole stream.
    fn decode_all(&self, bits: &Bitstream) -> Result<Vec<Symbol>> {
        let mut symbols = Vec::new();
        let mut offset = 0;
        while offset < bits.len() {
            let (symbol, next) = self.decode_one(bits, offset)?;
            symbols.push(symbol);
            offset = next;
        }
        Ok(symbols)
    }
}

/// Source of candidate codeword lengths for speculation.
///
/// A predictor proposes bit distances from the decode frontier at which the
/// next codewords are likely to start. Variants differ only in how they
/// rank candidates; the scheduler treats them all alike.
pub trait LengthPredictor: Send + Sync {
    /// Short identifier for reports.
    fn name(&self) -> &'static str;

    /// Propose up to `width()` candidate lengths for the given frontier.
    ///
    /// Context-free variants ignore `context`.
    fn predict(&self, frontier: usize, context: &Context) -> Candidates;

    /// Maximum number of candidates returned per call.
    fn width(&self) -> usize;

    /// Context to start a stream with.
    fn initial_context(&self) -> Context {
        Context::new(0)
    }

    /// Number of distinct prediction entries held by the model.
    fn cardinality(&self) -> usize {
        1
    }
}
