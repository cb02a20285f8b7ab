//! Context-free predictor: one static vector for every frontier.

use crate::distribution::LengthDistribution;
use crate::optimizer::VectorOptimizer;
use huffspec_core::{Candidates, Context, Error, LengthPredictor, Result};
use tracing::debug;

/// Predicts the same ranked lengths regardless of decode history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFreePredictor {
    vector: Candidates,
    width: usize,
}

impl ContextFreePredictor {
    /// The `width` lengths with the highest probability mass.
    ///
    /// The vector keeps rank order, most probable length first.
    pub fn new(distribution: &LengthDistribution, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::config("speculation_width must be at least 1"));
        }
        let vector = distribution.top(width);
        if vector.is_empty() {
            return Err(Error::config("length distribution has no support"));
        }
        debug!(
            "Context-free vector {:?} (expected rate {:.4})",
            vector,
            VectorOptimizer::new(distribution).score(&vector).expected_rate
        );
        Ok(Self { vector, width })
    }

    /// The `width`-subset of lengths with the best expected rate.
    pub fn optimized(distribution: &LengthDistribution, width: usize) -> Result<Self> {
        let scored = VectorOptimizer::new(distribution).optimize(width)?;
        debug!(
            "Optimized context-free vector {:?} (expected rate {:.4})",
            scored.vector, scored.expected_rate
        );
        Ok(Self {
            vector: scored.vector,
            width,
        })
    }

    /// Use an explicit vector.
    pub fn from_vector(vector: &[u32]) -> Result<Self> {
        if vector.is_empty() {
            return Err(Error::config("candidate vector is empty"));
        }
        Ok(Self {
            vector: vector.iter().copied().collect(),
            width: vector.len(),
        })
    }

    /// Candidate lengths, in prediction order.
    pub fn vector(&self) -> &[u32] {
        &self.vector
    }
}

impl LengthPredictor for ContextFreePredictor {
    fn name(&self) -> &'static str {
        "context-free"
    }

    #[inline]
    fn predict(&self, _frontier: usize, _context: &Context) -> Candidates {
        self.vector.clone()
    }

    fn width(&self) -> usize {
        self.width
    }
}
