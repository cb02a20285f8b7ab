//! Speculation configuration.
//!
//! One immutable value drives predictor selection and the scheduler; the
//! decoder holds no process-wide state.

use huffspec_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a context-free predictor picks its static candidate vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VectorSelection {
    /// The `w` most probable lengths.
    #[default]
    Greedy,
    /// The `w`-subset of lengths with the highest expected decode rate.
    Optimized,
}

/// Lookahead bound of a single decode unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// Maximum codewords decoded per unit.
    pub max_symbols: usize,
    /// Stop a unit once it reaches the next farther hypothesis offset.
    pub stop_at_next_hypothesis: bool,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            max_symbols: 1,
            stop_at_next_hypothesis: true,
        }
    }
}

impl Horizon {
    /// Horizon decoding at most `max_symbols` codewords per unit.
    pub fn symbols(max_symbols: usize) -> Self {
        Self {
            max_symbols,
            ..Default::default()
        }
    }
}

/// Configuration for speculative decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeculationConfig {
    /// Number of hypotheses explored per step (w).
    pub speculation_width: usize,
    /// Exact length distribution from the data, or estimated from code lengths.
    pub use_real_probabilities: bool,
    /// Use the position-restricted predictor instead of a predictive one.
    pub use_baseline: bool,
    /// Context order k; `Some` selects the context-aware predictor.
    pub model_order: Option<usize>,
    /// Static vector selection for the context-free predictor.
    pub vector_selection: VectorSelection,
    /// Decode unit lookahead.
    pub horizon: Horizon,
    /// Maximum codewords committed in a single step.
    pub chain_length_limit: Option<usize>,
    /// Minimum units in a step before they are spread over the thread pool.
    ///
    /// A step launches at most `speculation_width + 1` units, so at the
    /// default width of 2 and threshold of 8 every step runs on the calling
    /// thread. Lower the threshold (or widen the vector to 7 or more) to
    /// decode units on rayon.
    pub parallel_threshold: usize,
}

impl Default for SpeculationConfig {
    fn default() -> Self {
        Self {
            speculation_width: 2,
            use_real_probabilities: true,
            use_baseline: false,
            model_order: None,
            vector_selection: VectorSelection::Greedy,
            horizon: Horizon::default(),
            chain_length_limit: None,
            // A single codeword decode is far cheaper than a rayon fork
            parallel_threshold: 8,
        }
    }
}

impl SpeculationConfig {
    /// Create a configuration with the given speculation width.
    pub fn new(speculation_width: usize) -> Self {
        Self {
            speculation_width,
            ..Default::default()
        }
    }

    /// Set the speculation width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.speculation_width = width;
        self
    }

    /// Choose exact or estimated length probabilities.
    pub fn with_real_probabilities(mut self, enabled: bool) -> Self {
        self.use_real_probabilities = enabled;
        self
    }

    /// Switch to the position-restricted baseline predictor.
    pub fn with_baseline(mut self, enabled: bool) -> Self {
        self.use_baseline = enabled;
        self
    }

    /// Use the context-aware predictor of order `k`.
    pub fn with_model_order(mut self, k: usize) -> Self {
        self.model_order = Some(k);
        self
    }

    /// Set the static vector selection.
    pub fn with_vector_selection(mut self, selection: VectorSelection) -> Self {
        self.vector_selection = selection;
        self
    }

    /// Set the decode unit horizon.
    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Cap the codewords committed per step.
    pub fn with_chain_length_limit(mut self, limit: usize) -> Self {
        self.chain_length_limit = Some(limit);
        self
    }

    /// Set the parallel execution threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Upper bound on decode units in one step: the ground truth plus one
    /// per candidate length.
    pub fn max_units_per_step(&self) -> usize {
        self.speculation_width.saturating_add(1)
    }

    /// Check if a full step reaches `parallel_threshold`.
    pub fn uses_thread_pool(&self) -> bool {
        cfg!(feature = "parallel")
            && self.max_units_per_step() > 1
            && self.max_units_per_step() >= self.parallel_threshold
    }

    /// Check the configuration before any decoding starts.
    pub fn validate(&self) -> Result<()> {
        if self.speculation_width == 0 {
            return Err(Error::config("speculation_width must be at least 1"));
        }
        if self.horizon.max_symbols == 0 {
            return Err(Error::config("horizon must allow at least 1 symbol"));
        }
        if self.chain_length_limit == Some(0) {
            return Err(Error::config("chain_length_limit must be at least 1"));
        }
        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
