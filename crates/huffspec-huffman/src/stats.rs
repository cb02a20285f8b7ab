//! Symbol statistics feeding code construction.

use huffspec_core::{Error, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Allowed deviation of a probability vector from a total mass of 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Statistics describing the source alphabet.
///
/// Entry order is significant: it is the stable insertion order used to
/// break ties between equal weights during construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolStats {
    /// Occurrence counts.
    Counts(Vec<(Symbol, u64)>),
    /// Exact probabilities; must sum to 1.
    Probabilities(Vec<(Symbol, f64)>),
    /// Known codeword lengths; weights are estimated as 2^-length.
    CodeLengths(Vec<(Symbol, u8)>),
}

impl SymbolStats {
    /// Count symbol occurrences, in first-occurrence order.
    pub fn from_symbols(data: &[Symbol]) -> Self {
        let mut position: HashMap<Symbol, usize> = HashMap::new();
        let mut counts: Vec<(Symbol, u64)> = Vec::new();

        for &symbol in data {
            match position.get(&symbol) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    position.insert(symbol, counts.len());
                    counts.push((symbol, 1));
                }
            }
        }

        SymbolStats::Counts(counts)
    }

    /// Number of symbols described.
    pub fn alphabet_size(&self) -> usize {
        match self {
            SymbolStats::Counts(v) => v.len(),
            SymbolStats::Probabilities(v) => v.len(),
            SymbolStats::CodeLengths(v) => v.len(),
        }
    }

    /// Symbols in entry order.
    pub fn symbols(&self) -> Vec<Symbol> {
        match self {
            SymbolStats::Counts(v) => v.iter().map(|&(s, _)| s).collect(),
            SymbolStats::Probabilities(v) => v.iter().map(|&(s, _)| s).collect(),
            SymbolStats::CodeLengths(v) => v.iter().map(|&(s, _)| s).collect(),
        }
    }

    /// Validated construction weights, in entry order.
    pub fn weights(&self) -> Result<Vec<(Symbol, f64)>> {
        check_alphabet(&self.symbols())?;

        match self {
            SymbolStats::Counts(v) => Ok(v.iter().map(|&(s, c)| (s, c as f64)).collect()),
            SymbolStats::Probabilities(v) => {
                if let Some(&(symbol, p)) = v.iter().find(|(_, p)| !p.is_finite() || *p < 0.0) {
                    return Err(Error::construction(format!(
                        "probability {} of symbol {} is not a finite non-negative number",
                        p, symbol
                    )));
                }
                let total: f64 = v.iter().map(|&(_, p)| p).sum();
                if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(Error::construction(format!(
                        "probabilities sum to {}, expected 1",
                        total
                    )));
                }
                Ok(v.clone())
            }
            SymbolStats::CodeLengths(v) => {
                if let Some(&(symbol, _)) = v.iter().find(|&&(_, len)| len == 0) {
                    return Err(Error::construction(format!(
                        "symbol {} has a zero code length",
                        symbol
                    )));
                }
                Ok(v
                    .iter()
                    .map(|&(s, len)| (s, (-(len as f64)).exp2()))
                    .collect())
            }
        }
    }
}

/// Reject empty, singleton, and duplicate alphabets.
pub(crate) fn check_alphabet(symbols: &[Symbol]) -> Result<()> {
    match symbols.len() {
        0 => return Err(Error::config("empty alphabet")),
        1 => {
            return Err(Error::construction(
                "alphabet must contain at least 2 symbols",
            ))
        }
        _ => {}
    }

    let mut seen = HashSet::with_capacity(symbols.len());
    for &symbol in symbols {
        if !seen.insert(symbol) {
            return Err(Error::construction(format!(
                "symbol {} listed more than once",
                symbol
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbols_first_occurrence_order() {
        let stats = SymbolStats::from_symbols(&[7, 3, 7, 9, 3, 7]);
        assert_eq!(stats, SymbolStats::Counts(vec![(7, 3), (3, 2), (9, 1)]));
        assert_eq!(stats.alphabet_size(), 3);
    }

    #[test]
    fn test_probabilities_must_normalize() {
        let stats = SymbolStats::Probabilities(vec![(0, 0.5), (1, 0.4)]);
        assert!(matches!(stats.weights(), Err(Error::CodeConstruction(_))));

        let stats = SymbolStats::Probabilities(vec![(0, 0.5), (1, 0.5)]);
        assert!(stats.weights().is_ok());
    }

    #[test]
    fn test_negative_probability_rejected() {
        let stats = SymbolStats::Probabilities(vec![(0, 1.5), (1, -0.5)]);
        assert!(matches!(stats.weights(), Err(Error::CodeConstruction(_))));
    }

    #[test]
    fn test_code_lengths_estimate_weights() {
        let stats = SymbolStats::CodeLengths(vec![(0, 1), (1, 2), (2, 2)]);
        let weights = stats.weights().unwrap();
        assert_eq!(weights, vec![(0, 0.5), (1, 0.25), (2, 0.25)]);

        let bad = SymbolStats::CodeLengths(vec![(0, 0), (1, 1)]);
        assert!(bad.weights().is_err());
    }

    #[test]
    fn test_alphabet_size_errors() {
        assert!(matches!(
            SymbolStats::Counts(vec![]).weights(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            SymbolStats::Counts(vec![(4, 10)]).weights(),
            Err(Error::CodeConstruction(_))
        ));
        assert!(matches!(
            SymbolStats::Counts(vec![(4, 10), (4, 2)]).weights(),
            Err(Error::CodeConstruction(_))
        ));
    }
}
