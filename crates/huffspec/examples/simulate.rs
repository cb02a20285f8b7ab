//! Speculative decoding simulation over a file or synthetic data.
//!
//! Usage: cargo run --example simulate -- [path] [max_width]
//!
//! Set RUST_LOG=huffspec_speculative=debug for per-decode detail.

use huffspec::{Metrics, Simulation, SpeculationConfig, Symbol, VectorSelection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn synthetic(len: usize) -> Vec<Symbol> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut prev = 0u32;
    (0..len)
        .map(|_| {
            prev = if rng.gen_bool(0.5) {
                (prev + 1) % 20
            } else {
                let x: f64 = rng.gen();
                (x * x * 96.0) as u32
            };
            prev
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("huffspec=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data: Vec<Symbol> = match args.next() {
        Some(path) => std::fs::read(&path)?.into_iter().map(Symbol::from).collect(),
        None => synthetic(200_000),
    };
    let max_width: usize = args.next().map(|w| w.parse()).transpose()?.unwrap_or(4);

    println!("=== Speculative Decoding Simulation ===");
    println!("Input: {} symbols\n", data.len());

    let mut metrics = Metrics::new();
    for width in 1..=max_width {
        let variants = [
            ("greedy", SpeculationConfig::new(width)),
            (
                "optimized",
                SpeculationConfig::new(width).with_vector_selection(VectorSelection::Optimized),
            ),
            ("order-3", SpeculationConfig::new(width).with_model_order(3)),
            ("baseline", SpeculationConfig::new(width).with_baseline(true)),
        ];

        for (label, config) in variants {
            match Simulation::new(config)?.run(&data) {
                Ok(report) => {
                    if report.correct {
                        metrics.record(&report.stats.throughput());
                    } else {
                        metrics.record_error();
                    }
                    println!(
                        "w={} {:<10} expected {:.4}  real {:.4}  correct {}",
                        width, label, report.expected_rate, report.decode_rate, report.correct
                    );
                }
                Err(e) => {
                    metrics.record_error();
                    println!("w={} {:<10} failed: {}", width, label, e);
                }
            }
        }
    }

    println!("\n{}", metrics.summary());
    Ok(())
}
