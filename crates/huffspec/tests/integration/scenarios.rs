//! Reference corpus scenarios.
//!
//! Run with: HUFFSPEC_CORPUS=/path/to/corpus cargo test --test integration -- --ignored
//!
//! The corpus is read as raw bytes, one symbol per byte.

use huffspec::{Simulation, SpeculationConfig, Symbol};
use std::path::PathBuf;

const CORPUS_SYMBOLS: usize = 2_067_960;
const CORPUS_ENCODED_BITS: u64 = 9_602_877;

fn corpus() -> Option<Vec<Symbol>> {
    let path = PathBuf::from(std::env::var_os("HUFFSPEC_CORPUS")?);
    let bytes = std::fs::read(&path)
        .unwrap_or_else(|e| panic!("cannot read corpus {}: {}", path.display(), e));
    Some(bytes.into_iter().map(Symbol::from).collect())
}

#[test]
#[ignore = "needs HUFFSPEC_CORPUS"]
fn test_scenario_baseline_width_two() {
    let Some(data) = corpus() else {
        eprintln!("HUFFSPEC_CORPUS not set, skipping");
        return;
    };
    assert_eq!(data.len(), CORPUS_SYMBOLS);

    let config = SpeculationConfig::new(2).with_baseline(true);
    let report = Simulation::new(config).unwrap().run(&data).unwrap();

    assert_eq!(report.vector.as_deref(), Some(&[3, 4][..]));
    assert_eq!(report.encoded_bits, CORPUS_ENCODED_BITS);
    assert!((report.compression_ratio - 1.7228).abs() < 1e-4);
    assert!(report.correct);
}

#[test]
#[ignore = "needs HUFFSPEC_CORPUS"]
fn test_scenario_context_aware_order_three() {
    let Some(data) = corpus() else {
        eprintln!("HUFFSPEC_CORPUS not set, skipping");
        return;
    };

    let config = SpeculationConfig::new(2).with_model_order(3);
    let report = Simulation::new(config).unwrap().run(&data).unwrap();

    assert!((report.expected_rate - 1.6907).abs() < 1e-3);
    assert_eq!(report.encoded_bits, CORPUS_ENCODED_BITS);
    assert_eq!(report.encoded_bytes, CORPUS_ENCODED_BITS.div_ceil(8));
    assert!(report.correct);
}
