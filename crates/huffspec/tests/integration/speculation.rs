//! Speculation safety, confirmation soundness and frontier monotonicity.

use huffspec::{
    Bitstream, CodeTable, ContextAwarePredictor, ContextFreePredictor, Error, ExactLengths,
    Horizon, HypothesisState, LengthDistribution, LengthPredictor, PositionRestrictedPredictor,
    PrefixDecoder, RecordingObserver, SpeculationConfig, SpeculativeDecoder, Symbol, SymbolStats,
    VectorSelection,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn skewed(len: usize, alphabet: u32, seed: u64) -> Vec<Symbol> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let x: f64 = rng.gen();
            (x * x * x * alphabet as f64) as Symbol
        })
        .collect()
}

/// Text-like data with strong local structure.
fn markov(len: usize, seed: u64) -> Vec<Symbol> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prev = 0u32;
    (0..len)
        .map(|_| {
            prev = if rng.gen_bool(0.7) {
                (prev + 1) % 12
            } else {
                rng.gen_range(0..30)
            };
            prev
        })
        .collect()
}

struct Fixture {
    data: Vec<Symbol>,
    table: CodeTable,
    bits: Bitstream,
    lengths: Vec<u32>,
}

impl Fixture {
    fn new(data: Vec<Symbol>) -> Self {
        let table = CodeTable::build(&SymbolStats::from_symbols(&data)).unwrap();
        let bits = table.encode(&data).unwrap();
        let lengths = table.code_lengths_of(&data).unwrap();
        Self {
            data,
            table,
            bits,
            lengths,
        }
    }

    fn distribution(&self) -> LengthDistribution {
        LengthDistribution::from_source(&ExactLengths::new(&self.lengths)).unwrap()
    }

    /// Bit offsets at which a codeword starts, plus the stream end.
    fn boundaries(&self) -> HashSet<usize> {
        let mut offset = 0;
        let mut set = HashSet::from([0]);
        for &length in &self.lengths {
            offset += length as usize;
            set.insert(offset);
        }
        set
    }

    fn predictors(&self, width: usize) -> Vec<Box<dyn LengthPredictor>> {
        let distribution = self.distribution();
        let max = self.table.max_code_length() as u32;
        vec![
            Box::new(ContextFreePredictor::new(&distribution, width).unwrap()),
            Box::new(ContextFreePredictor::optimized(&distribution, width).unwrap()),
            Box::new(ContextAwarePredictor::train(1, &self.lengths, width).unwrap()),
            Box::new(ContextAwarePredictor::train(3, &self.lengths, width).unwrap()),
            Box::new(
                PositionRestrictedPredictor::from_code_lengths(
                    &distribution.support(),
                    width,
                    max,
                )
                .unwrap(),
            ),
            Box::new(PositionRestrictedPredictor::with_stride(1, width, max).unwrap()),
        ]
    }
}

#[test]
fn test_differential_against_sequential() {
    for (seed, data) in [(1, skewed(3_000, 50, 1)), (2, markov(3_000, 2))] {
        let fixture = Fixture::new(data);
        let sequential = fixture.table.decode_all(&fixture.bits).unwrap();
        assert_eq!(sequential, fixture.data, "seed {}", seed);

        for width in [1, 2, 3, 5, 8] {
            for predictor in fixture.predictors(width) {
                let config = SpeculationConfig::new(width);
                let decoder =
                    SpeculativeDecoder::new(&fixture.table, predictor.as_ref(), config).unwrap();
                let output = decoder.decode(&fixture.bits).unwrap();

                assert_eq!(
                    output.symbols,
                    sequential,
                    "{} w={} seed {}",
                    predictor.name(),
                    width,
                    seed
                );
                assert_eq!(output.stats.bits, fixture.bits.len() as u64);
                assert_eq!(output.stats.symbols, fixture.data.len() as u64);
            }
        }
    }
}

#[test]
fn test_confirmation_soundness() {
    let fixture = Fixture::new(markov(2_000, 3));
    let boundaries = fixture.boundaries();

    for predictor in fixture.predictors(3) {
        let decoder = SpeculativeDecoder::new(
            &fixture.table,
            predictor.as_ref(),
            SpeculationConfig::new(3),
        )
        .unwrap();
        let mut observer = RecordingObserver::new();
        decoder
            .decode_with_observer(&fixture.bits, &mut observer)
            .unwrap();

        for (hypothesis, boundary) in &observer.confirmations {
            assert_eq!(hypothesis.state(), HypothesisState::Confirmed);
            assert_eq!(hypothesis.offset(), *boundary);
            assert!(boundaries.contains(boundary));
        }
        for (hypothesis, _) in &observer.rejections {
            assert_eq!(hypothesis.state(), HypothesisState::Rejected);
        }

        let confirmed: usize = observer.steps.iter().map(|s| s.confirmed).sum();
        assert_eq!(confirmed, observer.confirmations.len());
    }
}

#[test]
fn test_frontier_monotonicity() {
    let fixture = Fixture::new(skewed(2_000, 30, 4));
    let distribution = fixture.distribution();
    let predictor = ContextFreePredictor::new(&distribution, 2).unwrap();
    let decoder =
        SpeculativeDecoder::new(&fixture.table, &predictor, SpeculationConfig::new(2)).unwrap();

    let mut observer = RecordingObserver::new();
    let output = decoder
        .decode_with_observer(&fixture.bits, &mut observer)
        .unwrap();

    let mut previous = 0;
    for event in &observer.steps {
        assert_eq!(event.frontier, previous);
        assert!(event.new_frontier > event.frontier);
        assert!(event.committed >= 1);
        assert!(event.units >= 1);
        previous = event.new_frontier;
    }
    assert_eq!(previous, fixture.bits.len());
    assert_eq!(observer.steps.len() as u64, output.stats.steps);
}

#[test]
fn test_context_aware_beats_blind_guessing() {
    let fixture = Fixture::new(markov(5_000, 5));
    let config = SpeculationConfig::new(2);

    let aware = ContextAwarePredictor::train(2, &fixture.lengths, 2).unwrap();
    let stride =
        PositionRestrictedPredictor::with_stride(1, 2, fixture.table.max_code_length() as u32)
            .unwrap();

    let aware_rate = SpeculativeDecoder::new(&fixture.table, &aware, config.clone())
        .unwrap()
        .decode(&fixture.bits)
        .unwrap()
        .stats
        .mean_committed();
    let stride_rate = SpeculativeDecoder::new(&fixture.table, &stride, config)
        .unwrap()
        .decode(&fixture.bits)
        .unwrap()
        .stats
        .mean_committed();

    assert!(aware_rate >= 1.0);
    assert!(aware_rate >= stride_rate);
}

#[test]
fn test_horizons_agree() {
    let fixture = Fixture::new(skewed(1_500, 20, 6));
    let predictor = ContextFreePredictor::new(&fixture.distribution(), 3).unwrap();

    let horizons = [
        Horizon::default(),
        Horizon::symbols(4),
        Horizon {
            max_symbols: 16,
            stop_at_next_hypothesis: false,
        },
    ];

    for horizon in horizons {
        for limit in [None, Some(2)] {
            let mut config = SpeculationConfig::new(3).with_horizon(horizon);
            if let Some(limit) = limit {
                config = config.with_chain_length_limit(limit);
            }
            let output = SpeculativeDecoder::new(&fixture.table, &predictor, config)
                .unwrap()
                .decode(&fixture.bits)
                .unwrap();

            assert!(output.matches(&fixture.data));
            if let Some(limit) = limit {
                assert!(output.stats.max_committed() <= limit);
            }
        }
    }
}

#[test]
fn test_parallel_threshold_is_transparent() {
    let fixture = Fixture::new(markov(2_000, 7));
    let predictor = ContextFreePredictor::new(&fixture.distribution(), 4).unwrap();

    let eager = SpeculationConfig::new(4).with_parallel_threshold(1);
    let never = SpeculationConfig::new(4).with_parallel_threshold(usize::MAX);

    let a = SpeculativeDecoder::new(&fixture.table, &predictor, eager)
        .unwrap()
        .decode(&fixture.bits)
        .unwrap();
    let b = SpeculativeDecoder::new(&fixture.table, &predictor, never)
        .unwrap()
        .decode(&fixture.bits)
        .unwrap();

    assert_eq!(a.symbols, b.symbols);
    assert_eq!(a.stats.committed_histogram, b.stats.committed_histogram);
    assert_eq!(a.stats.tries, b.stats.tries);
}

#[test]
fn test_width_beyond_support() {
    let fixture = Fixture::new(vec![0, 1, 0, 0, 1, 0, 1, 1, 0]);
    let predictor = ContextFreePredictor::new(&fixture.distribution(), 1).unwrap();

    let output = SpeculativeDecoder::new(&fixture.table, &predictor, SpeculationConfig::new(32))
        .unwrap()
        .decode(&fixture.bits)
        .unwrap();
    assert!(output.matches(&fixture.data));
}

#[test]
fn test_ground_truth_failure_is_fatal() {
    let fixture = Fixture::new(skewed(200, 10, 8));
    let predictor = ContextFreePredictor::new(&fixture.distribution(), 2).unwrap();

    // Dropping the final bit leaves the last codeword incomplete
    let cut = fixture.bits.len() - 1;
    let bytes = fixture.bits.as_bytes()[..cut.div_ceil(8)].to_vec();
    let truncated = Bitstream::from_parts(bytes, cut).unwrap();
    let expected = fixture.table.decode_all(&truncated).unwrap_err();

    let actual = SpeculativeDecoder::new(&fixture.table, &predictor, SpeculationConfig::new(2))
        .unwrap()
        .decode(&truncated)
        .unwrap_err();

    assert!(matches!(actual, Error::MalformedBitstream { .. }));
    assert_eq!(actual.offset(), expected.offset());
    assert!(actual.offset().is_some());
}

#[test]
fn test_selection_modes_decode_identically() {
    let fixture = Fixture::new(skewed(1_000, 40, 9));
    let distribution = fixture.distribution();

    for selection in [VectorSelection::Greedy, VectorSelection::Optimized] {
        let predictor = match selection {
            VectorSelection::Greedy => ContextFreePredictor::new(&distribution, 2),
            VectorSelection::Optimized => ContextFreePredictor::optimized(&distribution, 2),
        }
        .unwrap();
        let output = SpeculativeDecoder::new(&fixture.table, &predictor, SpeculationConfig::new(2))
            .unwrap()
            .decode(&fixture.bits)
            .unwrap();
        assert_eq!(
            output.symbols,
            fixture.table.decode_all(&fixture.bits).unwrap()
        );
    }
}

#[test]
fn test_context_aware_near_model_window() {
    let data = markov(12, 10);
    for len in 2..=8 {
        let prefix = &data[..len];
        if prefix.iter().all(|&s| s == prefix[0]) {
            continue;
        }
        let fixture = Fixture::new(prefix.to_vec());
        let sequential = fixture.table.decode_all(&fixture.bits).unwrap();

        for order in [len - 1, len, len + 3] {
            let predictor = ContextAwarePredictor::train(order, &fixture.lengths, 2).unwrap();
            let output =
                SpeculativeDecoder::new(&fixture.table, &predictor, SpeculationConfig::new(2))
                    .unwrap()
                    .decode(&fixture.bits)
                    .unwrap();

            assert_eq!(output.symbols, sequential, "len {} order {}", len, order);
            if order >= len {
                assert_eq!(predictor.cardinality(), 0);
            }
        }
    }
}
