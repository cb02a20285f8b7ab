//! Position-restricted baseline predictor.
//!
//! Ignores codeword probabilities altogether. Offsets are either the
//! smallest distances at which a codeword boundary can occur at all (sums of
//! code lengths) or multiples of a fixed stride. Used only for comparison.

use huffspec_core::{Candidates, Context, Error, LengthPredictor, Result};

/// The `n` smallest sums of one or more code lengths, bounded by `max_length`.
pub fn baseline_set(lengths: &[u32], n: usize, max_length: u32) -> Candidates {
    let max = max_length as usize;
    let mut reachable = vec![false; max + 1];

    for sum in 1..=max {
        let hit = lengths.iter().any(|&l| {
            let l = l as usize;
            l > 0 && l <= sum && (l == sum || reachable[sum - l])
        });
        reachable[sum] = hit;
    }

    (1..=max)
        .filter(|&s| reachable[s])
        .take(n)
        .map(|s| s as u32)
        .collect()
}

/// Proposes fixed offsets from the frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRestrictedPredictor {
    offsets: Candidates,
    width: usize,
}

impl PositionRestrictedPredictor {
    /// Smallest reachable boundary distances for a code.
    ///
    /// # Errors
    /// `Config` if `width` is 0 or no boundary is reachable within
    /// `max_length`.
    pub fn from_code_lengths(lengths: &[u32], width: usize, max_length: u32) -> Result<Self> {
        if width == 0 {
            return Err(Error::config("speculation_width must be at least 1"));
        }
        let offsets = baseline_set(lengths, width, max_length);
        if offsets.is_empty() {
            return Err(Error::config("no code length fits the maximum length"));
        }
        Ok(Self { offsets, width })
    }

    /// Multiples of `stride` up to `max_length`.
    pub fn with_stride(stride: u32, width: usize, max_length: u32) -> Result<Self> {
        if width == 0 {
            return Err(Error::config("speculation_width must be at least 1"));
        }
        if stride == 0 || stride > max_length {
            return Err(Error::config(format!(
                "stride {} outside 1..={}",
                stride, max_length
            )));
        }
        let offsets = (1..=width as u32)
            .map(|i| i * stride)
            .take_while(|&offset| offset <= max_length)
            .collect();
        Ok(Self { offsets, width })
    }

    /// Proposed offsets, ascending.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

impl LengthPredictor for PositionRestrictedPredictor {
    fn name(&self) -> &'static str {
        "position-restricted"
    }

    #[inline]
    fn predict(&self, _frontier: usize, _context: &Context) -> Candidates {
        self.offsets.clone()
    }

    fn width(&self) -> usize {
        self.width
    }
}
