//! End-to-end simulation driver.
//!
//! Builds the code from the input, trains the configured predictor, computes
//! the theoretical rate, encodes, decodes speculatively and checks the result
//! against the input.
//!
//! ```text
//! symbols ─> SymbolStats ─> CodeTable ─┬─> code lengths ─> distribution ─> predictor
//!                                      └─> encode ─> Bitstream ─> SpeculativeDecoder
//! ```

use huffspec_core::{Error, LengthPredictor, Result, Symbol};
use huffspec_huffman::{CodeTable, SymbolStats};
use huffspec_speculative::{
    ConditionalRate, ConditionalScheme, ContextAwarePredictor, ContextFreePredictor,
    ContextFreeRate, DecodeStats, EstimatedLengths, ExactLengths, KGramModel, LengthDistribution,
    LengthSource, PositionRestrictedPredictor, SpeculationConfig, SpeculativeDecoder,
    VectorSelection,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Bits per symbol of byte-oriented input.
pub const DEFAULT_SYMBOL_BITS: u32 = 8;

/// Outcome of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Predictor identifier.
    pub predictor: String,
    /// Number of prediction entries held by the predictor.
    pub cardinality: usize,
    /// Speculation width w.
    pub speculation_width: usize,
    /// Context order, for the context-aware predictor.
    pub model_order: Option<usize>,
    /// Static candidate vector, when the predictor has one.
    pub vector: Option<Vec<u32>>,
    /// Length distribution source.
    pub length_source: String,
    /// Theoretical codewords committed per step.
    pub expected_rate: f64,
    /// Theoretical rate of the static vector under an order-1 model.
    pub conditional_expected_rate: Option<f64>,
    /// Input symbols.
    pub original_symbols: usize,
    /// Encoded size in bits.
    pub encoded_bits: u64,
    /// Encoded size in whole bytes.
    pub encoded_bytes: u64,
    /// Raw bits / encoded bits.
    pub compression_ratio: f64,
    /// Realized codewords committed per step.
    pub decode_rate: f64,
    /// Decoded output equals the input.
    pub correct: bool,
    /// Decode statistics.
    pub stats: DecodeStats,
}

impl SimulationReport {
    /// Serialize as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "predictor               = {}", self.predictor)?;
        writeln!(f, "cardinality             = {}", self.cardinality)?;
        writeln!(f, "w                       = {}", self.speculation_width)?;
        if let Some(k) = self.model_order {
            writeln!(f, "k                       = {}", k)?;
        }
        if let Some(vector) = &self.vector {
            writeln!(f, "selected L              = {:?}", vector)?;
        }
        writeln!(f, "length source           = {}", self.length_source)?;
        writeln!(f, "expected total rate     = {:.4}", self.expected_rate)?;
        if let Some(rate) = self.conditional_expected_rate {
            writeln!(f, "expected total rate [k] = {:.4}", rate)?;
        }
        writeln!(f, "original size           = {}", self.original_symbols)?;
        writeln!(
            f,
            "compressed size         = {} (bytes)\t{} (bits)",
            self.encoded_bytes, self.encoded_bits
        )?;
        writeln!(f, "compression ratio       = {:.4}", self.compression_ratio)?;
        writeln!(f, "decoded correctly       = {}", self.correct)?;
        writeln!(f, "real decoding rate      = {:.4}", self.decode_rate)?;
        write!(f, "{}", self.stats)
    }
}

/// A predictor together with its theoretical rate.
struct PreparedPredictor {
    predictor: Box<dyn LengthPredictor>,
    vector: Option<Vec<u32>>,
    expected_rate: f64,
    conditional_expected_rate: Option<f64>,
}

/// Simulation driver.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SpeculationConfig,
    symbol_bits: u32,
}

impl Simulation {
    /// Create a simulation; the configuration is validated up front.
    pub fn new(config: SpeculationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            symbol_bits: DEFAULT_SYMBOL_BITS,
        })
    }

    /// Set the raw width of one input symbol.
    pub fn with_symbol_bits(mut self, bits: u32) -> Self {
        self.symbol_bits = bits;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &SpeculationConfig {
        &self.config
    }

    /// Simulate with the input as its own training data.
    pub fn run(&self, data: &[Symbol]) -> Result<SimulationReport> {
        self.run_with_reference(data, None)
    }

    /// Simulate, training the context-aware predictor on `reference`.
    ///
    /// `reference` must only use symbols present in `data`.
    pub fn run_with_reference(
        &self,
        data: &[Symbol],
        reference: Option<&[Symbol]>,
    ) -> Result<SimulationReport> {
        check_input(data)?;
        let table = CodeTable::build(&SymbolStats::from_symbols(data))?;
        let lengths = table.code_lengths_of(data)?;

        let exact = ExactLengths::new(&lengths);
        let estimated = EstimatedLengths::new(table.entries().map(|(_, len)| len));
        let source: &dyn LengthSource = if self.config.use_real_probabilities {
            &exact
        } else {
            &estimated
        };
        let distribution = LengthDistribution::from_source(source)?;

        let training = match reference {
            Some(reference) => table.code_lengths_of(reference)?,
            None => lengths.clone(),
        };
        let prepared = self.prepare_predictor(&table, &distribution, &training)?;
        debug!(
            "Prepared {} predictor, expected rate {:.4}",
            prepared.predictor.name(),
            prepared.expected_rate
        );

        let bits = table.encode(data)?;
        let ratio = table.compression_ratio(data, self.symbol_bits)?;

        let decoder = SpeculativeDecoder::new(
            &table,
            prepared.predictor.as_ref(),
            self.config.clone(),
        )?;
        let output = decoder.decode(&bits)?;
        let correct = output.matches(data);

        let report = SimulationReport {
            predictor: prepared.predictor.name().to_string(),
            cardinality: prepared.predictor.cardinality(),
            speculation_width: self.config.speculation_width,
            model_order: self.config.model_order.filter(|_| !self.config.use_baseline),
            vector: prepared.vector,
            length_source: source.name().to_string(),
            expected_rate: prepared.expected_rate,
            conditional_expected_rate: prepared.conditional_expected_rate,
            original_symbols: data.len(),
            encoded_bits: bits.len() as u64,
            encoded_bytes: bits.as_bytes().len() as u64,
            compression_ratio: ratio.ratio(),
            decode_rate: output.stats.mean_committed(),
            correct,
            stats: output.stats,
        };

        info!(
            "Simulation ({}, w={}): ratio {:.4}, expected rate {:.4}, real rate {:.4}, correct {}",
            report.predictor,
            report.speculation_width,
            report.compression_ratio,
            report.expected_rate,
            report.decode_rate,
            report.correct
        );

        Ok(report)
    }

    fn prepare_predictor(
        &self,
        table: &CodeTable,
        distribution: &LengthDistribution,
        training: &[u32],
    ) -> Result<PreparedPredictor> {
        let width = self.config.speculation_width;

        if self.config.use_baseline {
            let support = distribution.support();
            let predictor = PositionRestrictedPredictor::from_code_lengths(
                &support,
                width,
                table.max_code_length() as u32,
            )?;
            let vector = predictor.offsets().to_vec();
            return Ok(static_vector(
                Box::new(predictor),
                vector,
                distribution,
                training,
            ));
        }

        if let Some(order) = self.config.model_order {
            let model = KGramModel::train(order + 1, training)?;
            let scheme = ConditionalScheme::new(&model);
            let predictor = ContextAwarePredictor::from_scheme(&scheme, width)?;

            // Without a trained context every step uses the backup vector
            let expected_rate = if scheme.is_empty() {
                ContextFreeRate::new(distribution).total_rate(predictor.backup())
            } else {
                1.0 + ConditionalRate::new(&scheme).complete_expectation_with_table(
                    predictor.assignment_table(),
                    predictor.backup(),
                )
            };

            return Ok(PreparedPredictor {
                predictor: Box::new(predictor),
                vector: None,
                expected_rate,
                conditional_expected_rate: None,
            });
        }

        let predictor = match self.config.vector_selection {
            VectorSelection::Greedy => ContextFreePredictor::new(distribution, width)?,
            VectorSelection::Optimized => ContextFreePredictor::optimized(distribution, width)?,
        };
        let vector = predictor.vector().to_vec();
        Ok(static_vector(
            Box::new(predictor),
            vector,
            distribution,
            training,
        ))
    }
}

fn static_vector(
    predictor: Box<dyn LengthPredictor>,
    vector: Vec<u32>,
    distribution: &LengthDistribution,
    training: &[u32],
) -> PreparedPredictor {
    let expected_rate = ContextFreeRate::new(distribution).total_rate(&vector);

    // Order-1 view of the same vector; needs at least one full window
    let conditional_expected_rate = KGramModel::train(2, training)
        .ok()
        .map(|model| ConditionalScheme::new(&model))
        .filter(|scheme| !scheme.is_empty())
        .map(|scheme| 1.0 + ConditionalRate::new(&scheme).complete_expectation(&vector));

    PreparedPredictor {
        predictor,
        vector: Some(vector),
        expected_rate,
        conditional_expected_rate,
    }
}

/// Check a simulation input before running it.
///
/// # Errors
/// `Config` for an empty input.
pub fn check_input(data: &[Symbol]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::config("empty alphabet"));
    }
    Ok(())
}
