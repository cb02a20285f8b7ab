//! Persisted artifacts: code table JSON, packed bitstream, configuration.

use huffspec::{
    Bitstream, CodeTable, ContextAwarePredictor, Horizon, PrefixDecoder, Simulation,
    SimulationReport, SpeculationConfig, SpeculativeDecoder, Symbol, SymbolStats,
    VectorSelection,
};

fn sample() -> Vec<Symbol> {
    "the quick brown fox jumps over the lazy dog; the dog sleeps on"
        .bytes()
        .map(Symbol::from)
        .collect()
}

#[test]
fn test_decode_from_persisted_artifacts() {
    let data = sample();
    let table = CodeTable::build(&SymbolStats::from_symbols(&data)).unwrap();
    let bits = table.encode(&data).unwrap();

    let table_json = table.to_json().unwrap();
    let packed = bits.to_bytes();

    let loaded_table = CodeTable::from_json(&table_json).unwrap();
    let loaded_bits = Bitstream::from_bytes(&packed).unwrap();
    assert_eq!(loaded_bits, bits);
    assert_eq!(loaded_bits.len(), table.encoded_bit_count(&data).unwrap() as usize);

    let lengths = loaded_table.code_lengths_of(&data).unwrap();
    let predictor = ContextAwarePredictor::train(2, &lengths, 2).unwrap();
    let output = SpeculativeDecoder::new(&loaded_table, &predictor, SpeculationConfig::new(2))
        .unwrap()
        .decode(&loaded_bits)
        .unwrap();

    assert!(output.matches(&data));
    assert_eq!(output.symbols, loaded_table.decode_all(&loaded_bits).unwrap());
}

#[test]
fn test_corrupted_artifacts_rejected() {
    assert!(Bitstream::from_bytes(&[]).is_err());
    assert!(Bitstream::from_bytes(&[9, 0xFF]).is_err());
    assert!(CodeTable::from_json("{\"entries\": 3}").is_err());
}

#[test]
fn test_config_round_trip() {
    let config = SpeculationConfig::new(4)
        .with_model_order(3)
        .with_vector_selection(VectorSelection::Optimized)
        .with_horizon(Horizon::symbols(8))
        .with_chain_length_limit(16);

    let json = config.to_json().unwrap();
    let parsed = SpeculationConfig::from_json(&json).unwrap();
    assert_eq!(parsed, config);

    let invalid = config.with_width(0).to_json().unwrap();
    assert!(SpeculationConfig::from_json(&invalid).is_err());
}

#[test]
fn test_report_round_trip() {
    let data = sample();
    let report = Simulation::new(SpeculationConfig::new(2).with_model_order(1))
        .unwrap()
        .run(&data)
        .unwrap();

    let parsed: SimulationReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed.original_symbols, data.len());
    assert_eq!(parsed.stats.steps, report.stats.steps);
    assert!(parsed.correct);
}
