//! Candidate vector selection by expected decode rate.
//!
//! Scores every `w`-subset of the distribution's support with the
//! context-free expectation and keeps the best one. Subsets are scored in
//! parallel when the `parallel` feature is enabled.

use crate::distribution::LengthDistribution;
use crate::theory::ContextFreeRate;
use huffspec_core::{Candidates, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A candidate vector with its expected total rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVector {
    /// Lengths, ascending.
    pub vector: Candidates,
    /// Expected codewords committed per step (1 + E).
    pub expected_rate: f64,
}

/// Exhaustive optimizer over subsets of the length support.
#[derive(Debug, Clone, Copy)]
pub struct VectorOptimizer<'a> {
    distribution: &'a LengthDistribution,
}

impl<'a> VectorOptimizer<'a> {
    /// Create an optimizer over `distribution`.
    pub fn new(distribution: &'a LengthDistribution) -> Self {
        Self { distribution }
    }

    /// Score one vector.
    pub fn score(&self, vector: &[u32]) -> ScoredVector {
        let mut sorted: Candidates = vector.iter().copied().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let expected_rate = ContextFreeRate::new(self.distribution).total_rate(&sorted);
        ScoredVector {
            vector: sorted,
            expected_rate,
        }
    }

    /// The `w` most probable lengths, scored.
    pub fn greedy(&self, w: usize) -> Result<ScoredVector> {
        self.check_width(w)?;
        Ok(self.score(&self.distribution.top(w)))
    }

    /// The best `w`-subset of the support.
    ///
    /// Widths beyond the support size use the whole support. Equal scores
    /// keep the lexicographically smallest vector.
    pub fn optimize(&self, w: usize) -> Result<ScoredVector> {
        self.check_width(w)?;

        let support = self.distribution.support();
        let variants = combinations(&support, w.min(support.len()));

        #[cfg(feature = "parallel")]
        let scored: Vec<ScoredVector> = variants.par_iter().map(|v| self.score(v)).collect();
        #[cfg(not(feature = "parallel"))]
        let scored: Vec<ScoredVector> = variants.iter().map(|v| self.score(v)).collect();

        let variant_count = scored.len();
        let best = scored
            .into_iter()
            .reduce(|best, candidate| {
                if candidate.expected_rate > best.expected_rate {
                    candidate
                } else {
                    best
                }
            })
            .ok_or_else(|| Error::config("length distribution has no support"))?;

        debug!(
            "Optimized {} variants of width {}: best {:?} at rate {:.4}",
            variant_count, w, best.vector, best.expected_rate
        );

        Ok(best)
    }

    fn check_width(&self, w: usize) -> Result<()> {
        if w == 0 {
            return Err(Error::config("speculation_width must be at least 1"));
        }
        if self.distribution.is_empty() {
            return Err(Error::config("length distribution has no support"));
        }
        Ok(())
    }
}

/// All `k`-subsets of `items`, in lexicographic order of positions.
pub fn combinations(items: &[u32], k: usize) -> Vec<Vec<u32>> {
    let n = items.len();
    if k > n {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();

    loop {
        result.push(indices.iter().map(|&i| items[i]).collect());

        // Rightmost index that can still move right
        let Some(pos) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            break;
        };
        indices[pos] += 1;
        for j in pos + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }

    result
}
