//! Prefix code decoding.
//!
//! Walks the canonical structure one bit at a time. At each length `L` the
//! codes of that length form the range `[first, first + count[L])`; a code
//! outside it continues with one more bit.

use crate::table::CodeTable;
use huffspec_core::{Bitstream, Error, PrefixDecoder, Result, Symbol};

impl CodeTable {
    /// Decode one codeword starting at bit `offset`.
    ///
    /// # Returns
    /// Tuple of (symbol, offset just past the codeword).
    ///
    /// # Errors
    /// `MalformedBitstream` carrying `offset` if the stream ends inside the
    /// codeword or the bits match no codeword (incomplete codes only).
    #[inline]
    pub fn decode_one(&self, bits: &Bitstream, offset: usize) -> Result<(Symbol, usize)> {
        let counts = self.counts();
        let sorted = self.sorted_symbols();

        let mut code = 0u64;
        let mut first = 0u64;
        let mut index = 0usize;

        for len in 1..=self.max_code_length() as usize {
            let bit = bits
                .bit(offset + len - 1)
                .ok_or_else(|| Error::malformed_at("stream ended inside a codeword", offset))?;
            code |= bit as u64;

            let count = counts[len] as u64;
            if code >= first && code - first < count {
                let symbol = sorted[index + (code - first) as usize];
                return Ok((symbol, offset + len));
            }

            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(Error::malformed_at("bits match no codeword", offset))
    }
}

impl PrefixDecoder for CodeTable {
    #[inline]
    fn decode_one(&self, bits: &Bitstream, offset: usize) -> Result<(Symbol, usize)> {
        CodeTable::decode_one(self, bits, offset)
    }

    fn max_code_length(&self) -> u8 {
        CodeTable::max_code_length(self)
    }

    fn code_length(&self, symbol: Symbol) -> Option<u8> {
        CodeTable::code_length(self, symbol)
    }
}
