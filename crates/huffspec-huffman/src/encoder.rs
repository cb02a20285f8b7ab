//! Prefix code encoding.

use crate::table::CodeTable;
use huffspec_core::{BitWriter, Bitstream, Error, Result, Symbol};

impl CodeTable {
    /// Concatenate the codewords of `symbols` into a bitstream.
    ///
    /// # Errors
    /// `UnknownSymbol` if a symbol is outside the alphabet.
    pub fn encode(&self, symbols: &[Symbol]) -> Result<Bitstream> {
        let bits = self.encoded_bit_count(symbols)?;
        let mut writer = BitWriter::with_capacity(bits as usize);

        for &symbol in symbols {
            let (code, len) = self.codeword(symbol).ok_or(Error::UnknownSymbol(symbol))?;
            writer.write_bits(code, len);
        }

        Ok(writer.finish())
    }
}
