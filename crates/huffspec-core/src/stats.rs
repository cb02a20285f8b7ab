//! Statistics and metrics for decode operations.

use serde::{Deserialize, Serialize};

/// Throughput of a single decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeThroughput {
    /// Symbols produced.
    pub symbols: u64,

    /// Bits consumed.
    pub bits: u64,

    /// Decode steps (frontier advances).
    pub steps: u64,

    /// Wall time in microseconds.
    pub time_us: u64,
}

impl DecodeThroughput {
    /// Create throughput from a completed decode.
    pub fn new(symbols: u64, bits: u64, steps: u64, time_us: u64) -> Self {
        DecodeThroughput {
            symbols,
            bits,
            steps,
            time_us,
        }
    }

    /// Symbols committed per decode step.
    pub fn symbols_per_step(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.symbols as f64 / self.steps as f64
    }

    /// Average codeword length.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.symbols == 0 {
            return 0.0;
        }
        self.bits as f64 / self.symbols as f64
    }

    /// Symbols per second of wall time.
    pub fn symbols_per_second(&self) -> f64 {
        if self.time_us == 0 {
            return 0.0;
        }
        self.symbols as f64 * 1_000_000.0 / self.time_us as f64
    }
}

/// Metrics collector for aggregate statistics.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Total decodes performed.
    pub total_decodes: u64,

    /// Total symbols decoded.
    pub total_symbols: u64,

    /// Total bits consumed.
    pub total_bits: u64,

    /// Total decode steps.
    pub total_steps: u64,

    /// Total time spent in microseconds.
    pub total_time_us: u64,

    /// Number of decodes that failed or produced wrong output.
    pub error_count: u64,
}

impl Metrics {
    /// Create new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed decode.
    pub fn record(&mut self, throughput: &DecodeThroughput) {
        self.total_decodes += 1;
        self.total_symbols += throughput.symbols;
        self.total_bits += throughput.bits;
        self.total_steps += throughput.steps;
        self.total_time_us += throughput.time_us;
    }

    /// Record an error.
    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    /// Average symbols per step across all decodes.
    pub fn average_rate(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.total_symbols as f64 / self.total_steps as f64
    }

    /// Get error rate (0.0 to 1.0).
    pub fn error_rate(&self) -> f64 {
        let attempts = self.total_decodes + self.error_count;
        if attempts == 0 {
            return 0.0;
        }
        self.error_count as f64 / attempts as f64
    }

    /// Reset all metrics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Get metrics summary as string.
    pub fn summary(&self) -> String {
        format!(
            "Decodes: {}, Symbols: {} in {} steps (rate: {:.4}), Bits: {}, Errors: {}",
            self.total_decodes,
            self.total_symbols,
            self.total_steps,
            self.average_rate(),
            self.total_bits,
            self.error_count,
        )
    }
}
