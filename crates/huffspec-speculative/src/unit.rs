//! Speculative decode units.
//!
//! A unit is a pure function of (decoder, bitstream, start offset, horizon).
//! It holds no shared mutable state, so any number of units can run on
//! independent workers and a rejected unit is simply dropped.

use huffspec_core::{Bitstream, PrefixDecoder, Result, Symbol};

/// Codewords decoded forward from one offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeculativeRun {
    start: usize,
    end: usize,
    symbols: Vec<(Symbol, u32)>,
}

impl SpeculativeRun {
    /// Offset of the first codeword.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset just past the last codeword.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Bits consumed.
    pub fn bits(&self) -> usize {
        self.end - self.start
    }

    /// Number of codewords.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if nothing was decoded.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// (symbol, codeword length) pairs in stream order.
    pub fn symbols(&self) -> &[(Symbol, u32)] {
        &self.symbols
    }

    /// Length of the first codeword.
    pub fn first_length(&self) -> Option<u32> {
        self.symbols.first().map(|&(_, len)| len)
    }
}

/// One unit of speculative work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeUnit {
    start: usize,
    max_symbols: usize,
    stop_at: Option<usize>,
}

impl DecodeUnit {
    /// Decode at most `max_symbols` codewords from `start`.
    pub fn new(start: usize, max_symbols: usize) -> Self {
        Self {
            start,
            max_symbols,
            stop_at: None,
        }
    }

    /// Also stop once the next codeword would start at or past `offset`.
    pub fn with_stop(mut self, offset: Option<usize>) -> Self {
        self.stop_at = offset;
        self
    }

    /// Start offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Execute the unit.
    ///
    /// # Errors
    /// The first decode error, with the offset of the failing codeword.
    pub fn run<D>(&self, decoder: &D, bits: &Bitstream) -> Result<SpeculativeRun>
    where
        D: PrefixDecoder + ?Sized,
    {
        let mut symbols = Vec::with_capacity(self.max_symbols.min(64));
        let mut offset = self.start;

        while symbols.len() < self.max_symbols
            && offset < bits.len()
            && self.stop_at.map_or(true, |stop| offset < stop)
        {
            let (symbol, next) = decoder.decode_one(bits, offset)?;
            symbols.push((symbol, (next - offset) as u32));
            offset = next;
        }

        Ok(SpeculativeRun {
            start: self.start,
            end: offset,
            symbols,
        })
    }
}
