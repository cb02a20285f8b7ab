//! Canonical prefix code tables.
//!
//! A [`CodeTable`] is the bijection Symbol ↔ Codeword plus the canonical
//! decode structure (codeword count per length and symbols in canonical
//! order). It is immutable after construction and shared read-only by every
//! decode unit.
//!
//! ## Canonical Assignment
//!
//! Symbols are ordered by (code length, symbol value). Codes of each length
//! are consecutive integers, starting at:
//!
//! ```text
//! next_code[1] = 0
//! next_code[L] = (next_code[L-1] + count[L-1]) << 1
//! ```

use crate::stats::check_alphabet;
use huffspec_core::{CompressionRatio, Error, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Longest supported codeword in bits.
pub const MAX_CODE_LENGTH: u8 = 63;

/// Canonical prefix code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr", into = "TableRepr")]
pub struct CodeTable {
    /// Alphabet in construction order.
    symbols: Vec<Symbol>,
    /// Code length per alphabet entry.
    lengths: Vec<u8>,
    /// Codeword bits per alphabet entry (LSB-aligned).
    codes: Vec<u64>,
    /// Symbol -> alphabet entry.
    index: HashMap<Symbol, usize>,
    /// Number of codewords of each length, indexed by length.
    counts: Vec<u32>,
    /// Symbols in canonical order.
    sorted: Vec<Symbol>,
    /// Longest codeword.
    max_length: u8,
}

/// Serialized form: symbol/length pairs in construction order.
#[derive(Serialize, Deserialize)]
struct TableRepr {
    entries: Vec<(Symbol, u8)>,
}

impl TryFrom<TableRepr> for CodeTable {
    type Error = Error;

    fn try_from(repr: TableRepr) -> Result<Self> {
        CodeTable::from_lengths(&repr.entries)
    }
}

impl From<CodeTable> for TableRepr {
    fn from(table: CodeTable) -> Self {
        TableRepr {
            entries: table.entries().collect(),
        }
    }
}

impl CodeTable {
    /// Build a canonical table from per-symbol code lengths.
    ///
    /// # Arguments
    /// * `entries` - (symbol, code length) pairs, in construction order
    ///
    /// # Errors
    /// `CodeConstruction` for fewer than 2 symbols, duplicates, lengths
    /// outside `1..=MAX_CODE_LENGTH`, or lengths violating the Kraft
    /// inequality.
    pub fn from_lengths(entries: &[(Symbol, u8)]) -> Result<Self> {
        let symbols: Vec<Symbol> = entries.iter().map(|&(s, _)| s).collect();
        check_alphabet(&symbols)?;

        let lengths: Vec<u8> = entries.iter().map(|&(_, len)| len).collect();
        if let Some(&(symbol, len)) = entries
            .iter()
            .find(|&&(_, len)| len == 0 || len > MAX_CODE_LENGTH)
        {
            return Err(Error::construction(format!(
                "symbol {} has code length {} outside 1..={}",
                symbol, len, MAX_CODE_LENGTH
            )));
        }

        let max_length = lengths.iter().copied().max().unwrap_or(0);

        // Kraft inequality in fixed point: sum(2^(63 - len)) <= 2^63
        let kraft: u128 = lengths
            .iter()
            .map(|&len| 1u128 << (MAX_CODE_LENGTH - len))
            .sum();
        if kraft > 1u128 << MAX_CODE_LENGTH {
            return Err(Error::construction(
                "code lengths are over-subscribed (Kraft sum exceeds 1)",
            ));
        }

        let mut counts = vec![0u32; max_length as usize + 1];
        for &len in &lengths {
            counts[len as usize] += 1;
        }

        let mut order: Vec<usize> = (0..symbols.len()).collect();
        order.sort_by_key(|&i| (lengths[i], symbols[i]));

        let mut next_code = vec![0u64; max_length as usize + 1];
        let mut code = 0u64;
        for bits in 1..=max_length as usize {
            code = (code + counts[bits - 1] as u64) << 1;
            next_code[bits] = code;
        }

        let mut codes = vec![0u64; symbols.len()];
        for &i in &order {
            let len = lengths[i] as usize;
            codes[i] = next_code[len];
            next_code[len] += 1;
        }

        let index = symbols.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        let sorted = order.iter().map(|&i| symbols[i]).collect();

        Ok(CodeTable {
            symbols,
            lengths,
            codes,
            index,
            counts,
            sorted,
            max_length,
        })
    }

    /// Number of symbols in the alphabet.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Alphabet in construction order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// (symbol, code length) pairs in construction order.
    pub fn entries(&self) -> impl Iterator<Item = (Symbol, u8)> + '_ {
        self.symbols.iter().copied().zip(self.lengths.iter().copied())
    }

    /// Longest codeword in bits.
    pub fn max_code_length(&self) -> u8 {
        self.max_length
    }

    /// Code length of a symbol.
    pub fn code_length(&self, symbol: Symbol) -> Option<u8> {
        self.index.get(&symbol).map(|&i| self.lengths[i])
    }

    /// Codeword bits and length of a symbol.
    pub fn codeword(&self, symbol: Symbol) -> Option<(u64, u8)> {
        self.index
            .get(&symbol)
            .map(|&i| (self.codes[i], self.lengths[i]))
    }

    /// Number of symbols per code length.
    pub fn length_histogram(&self) -> BTreeMap<u8, usize> {
        let mut histogram = BTreeMap::new();
        for &len in &self.lengths {
            *histogram.entry(len).or_insert(0) += 1;
        }
        histogram
    }

    /// Kraft sum, 1.0 for a complete code.
    pub fn kraft_sum(&self) -> f64 {
        self.lengths
            .iter()
            .map(|&len| (-(len as f64)).exp2())
            .sum()
    }

    /// Code length of every symbol in `data`.
    pub fn code_lengths_of(&self, data: &[Symbol]) -> Result<Vec<u32>> {
        data.iter()
            .map(|&s| {
                self.code_length(s)
                    .map(u32::from)
                    .ok_or(Error::UnknownSymbol(s))
            })
            .collect()
    }

    /// Total bits needed to encode `data`.
    pub fn encoded_bit_count(&self, data: &[Symbol]) -> Result<u64> {
        data.iter().try_fold(0u64, |acc, &s| {
            self.code_length(s)
                .map(|len| acc + len as u64)
                .ok_or(Error::UnknownSymbol(s))
        })
    }

    /// Compression ratio of `data` against a `symbol_bits`-wide raw form.
    pub fn compression_ratio(&self, data: &[Symbol], symbol_bits: u32) -> Result<CompressionRatio> {
        let compressed = self.encoded_bit_count(data)?;
        Ok(CompressionRatio::new(
            data.len() as u64 * symbol_bits as u64,
            compressed,
        ))
    }

    /// Check that no codeword is a prefix of another.
    ///
    /// Quadratic in alphabet size; meant for validation, not hot paths.
    pub fn is_prefix_free(&self) -> bool {
        for a in 0..self.symbols.len() {
            for b in 0..self.symbols.len() {
                if a == b || self.lengths[a] > self.lengths[b] {
                    continue;
                }
                let shift = self.lengths[b] - self.lengths[a];
                if self.codes[b] >> shift == self.codes[a] {
                    return false;
                }
            }
        }
        true
    }

    /// Serialize the table as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a table serialized with [`CodeTable::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Codeword count per length, indexed by length.
    pub(crate) fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Symbols in canonical order.
    pub(crate) fn sorted_symbols(&self) -> &[Symbol] {
        &self.sorted
    }
}
