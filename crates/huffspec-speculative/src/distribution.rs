//! Codeword length distributions.
//!
//! Two sources produce the same [`LengthDistribution`]: exact frequencies
//! measured over a stream of committed lengths, or masses estimated from the
//! code alone (`2^-len` per codeword). Predictors never see which one was used.

use huffspec_core::{Candidates, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Allowed deviation of the total mass from 1.
const MASS_TOLERANCE: f64 = 1e-9;

/// Mapping codeword length -> probability mass; masses sum to 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LengthDistribution {
    masses: BTreeMap<u32, f64>,
}

impl LengthDistribution {
    /// Build from non-negative weights, normalizing to a total mass of 1.
    ///
    /// Zero-weight lengths are dropped.
    ///
    /// # Errors
    /// `Config` if no positive weight is given or a weight is negative or
    /// not finite.
    pub fn from_weights(weights: impl IntoIterator<Item = (u32, f64)>) -> Result<Self> {
        let mut masses = BTreeMap::new();
        for (length, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::config(format!(
                    "length {} has invalid weight {}",
                    length, weight
                )));
            }
            if weight > 0.0 {
                *masses.entry(length).or_insert(0.0) += weight;
            }
        }

        let total: f64 = masses.values().sum();
        if total <= 0.0 {
            return Err(Error::config("length distribution has no mass"));
        }
        for mass in masses.values_mut() {
            *mass /= total;
        }

        Ok(Self { masses })
    }

    /// Build from any [`LengthSource`].
    pub fn from_source(source: &dyn LengthSource) -> Result<Self> {
        source.distribution()
    }

    /// Probability of a codeword of `length` bits.
    pub fn p(&self, length: u32) -> f64 {
        self.masses.get(&length).copied().unwrap_or(0.0)
    }

    /// Lengths with non-zero mass, ascending.
    pub fn support(&self) -> Vec<u32> {
        self.masses.keys().copied().collect()
    }

    /// Number of lengths with non-zero mass.
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Check if the distribution is empty.
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Longest length with non-zero mass.
    pub fn max_length(&self) -> Option<u32> {
        self.masses.keys().next_back().copied()
    }

    /// (length, mass) pairs, ascending by length.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.masses.iter().map(|(&l, &p)| (l, p))
    }

    /// Lengths by descending mass; equal masses rank the shorter length first.
    pub fn ranked(&self) -> Vec<u32> {
        let mut lengths: Vec<(u32, f64)> = self.iter().collect();
        lengths.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        lengths.into_iter().map(|(l, _)| l).collect()
    }

    /// The `n` most probable lengths, in rank order.
    pub fn top(&self, n: usize) -> Candidates {
        self.ranked().into_iter().take(n).collect()
    }

    /// Check that masses sum to 1.
    pub fn is_normalized(&self) -> bool {
        (self.masses.values().sum::<f64>() - 1.0).abs() < MASS_TOLERANCE
    }

    /// Expected codeword length in bits.
    pub fn mean_length(&self) -> f64 {
        self.iter().map(|(l, p)| l as f64 * p).sum()
    }
}

/// Capability producing a [`LengthDistribution`].
pub trait LengthSource {
    /// Short identifier for reports.
    fn name(&self) -> &'static str;

    /// Produce the distribution.
    fn distribution(&self) -> Result<LengthDistribution>;
}

/// Exact frequencies of codeword lengths over a decoded stream.
#[derive(Debug, Clone, Copy)]
pub struct ExactLengths<'a> {
    lengths: &'a [u32],
}

impl<'a> ExactLengths<'a> {
    /// Measure over the code length of every symbol of a stream.
    pub fn new(lengths: &'a [u32]) -> Self {
        Self { lengths }
    }
}

impl LengthSource for ExactLengths<'_> {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn distribution(&self) -> Result<LengthDistribution> {
        let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
        for &length in self.lengths {
            *counts.entry(length).or_insert(0) += 1;
        }
        LengthDistribution::from_weights(counts.into_iter().map(|(l, c)| (l, c as f64)))
    }
}

/// Masses estimated from code lengths alone: `Σ 2^-len` per length.
#[derive(Debug, Clone)]
pub struct EstimatedLengths {
    code_lengths: Vec<u8>,
}

impl EstimatedLengths {
    /// Estimate from the code length of every alphabet symbol.
    pub fn new(code_lengths: impl IntoIterator<Item = u8>) -> Self {
        Self {
            code_lengths: code_lengths.into_iter().collect(),
        }
    }
}

impl LengthSource for EstimatedLengths {
    fn name(&self) -> &'static str {
        "estimated"
    }

    fn distribution(&self) -> Result<LengthDistribution> {
        LengthDistribution::from_weights(
            self.code_lengths
                .iter()
                .map(|&len| (len as u32, (-(len as f64)).exp2())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_distribution() {
        let lengths = [1, 2, 2, 3, 3, 3, 3, 3];
        let dist = ExactLengths::new(&lengths).distribution().unwrap();

        assert!((dist.p(1) - 0.125).abs() < 1e-12);
        assert!((dist.p(2) - 0.25).abs() < 1e-12);
        assert!((dist.p(3) - 0.625).abs() < 1e-12);
        assert_eq!(dist.p(4), 0.0);
        assert!(dist.is_normalized());
        assert_eq!(dist.support(), vec![1, 2, 3]);
        assert_eq!(dist.max_length(), Some(3));
    }

    #[test]
    fn test_estimated_distribution() {
        // Complete code 1, 2, 3, 3 -> masses 0.5, 0.25, 0.25
        let dist = EstimatedLengths::new([1, 2, 3, 3]).distribution().unwrap();
        assert!((dist.p(1) - 0.5).abs() < 1e-12);
        assert!((dist.p(2) - 0.25).abs() < 1e-12);
        assert!((dist.p(3) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_estimated_normalizes_incomplete_code() {
        let dist = EstimatedLengths::new([2, 2]).distribution().unwrap();
        assert!((dist.p(2) - 1.0).abs() < 1e-12);
        assert!(dist.is_normalized());
    }

    #[test]
    fn test_ranking_breaks_ties_by_length() {
        let dist =
            LengthDistribution::from_weights([(5, 0.2), (3, 0.4), (4, 0.2), (2, 0.2)]).unwrap();
        assert_eq!(dist.ranked(), vec![3, 2, 4, 5]);
        assert_eq!(dist.top(2).as_slice(), &[3, 2]);
        assert_eq!(dist.top(10).len(), 4);
    }

    #[test]
    fn test_empty_source_rejected() {
        assert!(ExactLengths::new(&[]).distribution().is_err());
        assert!(LengthDistribution::from_weights([(1, -1.0)]).is_err());
    }

    #[test]
    fn test_mean_length() {
        let dist = LengthDistribution::from_weights([(1, 1.0), (3, 1.0)]).unwrap();
        assert!((dist.mean_length() - 2.0).abs() < 1e-12);
    }
}
