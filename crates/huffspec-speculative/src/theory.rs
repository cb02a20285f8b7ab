//! Expected decode rate of a candidate vector.
//!
//! For an ascending vector `L` of hypothesis lengths, the number of extra
//! codewords committed per step beyond the ground-truth one is
//!
//! ```text
//! E(L) = Σ_i p(L_i) · (1 + E((L_j - L_i) for j > i))
//! ```
//!
//! since when the codeword at the frontier has length `L_i`, hypothesis `i`
//! is confirmed and the farther hypotheses become offsets relative to it.
//! The conditional form replaces `p(L_i)` by `p(L_i | c)` and shifts `L_i`
//! into the context on each level. The expected total rate is `1 + E`.

use crate::distribution::LengthDistribution;
use crate::kgram::{ConditionalScheme, Gram};
use huffspec_core::Candidates;
use std::collections::HashMap;

/// Sort ascending, drop zero and duplicate lengths.
fn normalize(vector: &[u32]) -> Vec<u32> {
    let mut sorted: Vec<u32> = vector.iter().copied().filter(|&l| l > 0).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

fn relative_to(vector: &[u32], i: usize) -> Vec<u32> {
    vector[i + 1..].iter().map(|&l| l - vector[i]).collect()
}

/// Memoized expectation under a context-free length distribution.
#[derive(Debug)]
pub struct ContextFreeRate<'a> {
    distribution: &'a LengthDistribution,
    memo: HashMap<Vec<u32>, f64>,
}

impl<'a> ContextFreeRate<'a> {
    /// Create a calculator over `distribution`.
    pub fn new(distribution: &'a LengthDistribution) -> Self {
        Self {
            distribution,
            memo: HashMap::new(),
        }
    }

    /// Expected extra codewords per step, E(L).
    pub fn expectation(&mut self, vector: &[u32]) -> f64 {
        let vector = normalize(vector);
        self.expectation_sorted(&vector)
    }

    /// Expected codewords per step, 1 + E(L).
    pub fn total_rate(&mut self, vector: &[u32]) -> f64 {
        1.0 + self.expectation(vector)
    }

    fn expectation_sorted(&mut self, vector: &[u32]) -> f64 {
        if vector.is_empty() {
            return 0.0;
        }
        if let Some(&cached) = self.memo.get(vector) {
            return cached;
        }

        let mut result = 0.0;
        for i in 0..vector.len() {
            let p = self.distribution.p(vector[i]);
            if p > 0.0 {
                result += p * (1.0 + self.expectation_sorted(&relative_to(vector, i)));
            }
        }

        self.memo.insert(vector.to_vec(), result);
        result
    }
}

/// Memoized expectation under an order-k conditional scheme.
#[derive(Debug)]
pub struct ConditionalRate<'a> {
    scheme: &'a ConditionalScheme,
    memo: HashMap<(Vec<u32>, Gram), f64>,
}

impl<'a> ConditionalRate<'a> {
    /// Create a calculator over `scheme`.
    pub fn new(scheme: &'a ConditionalScheme) -> Self {
        Self {
            scheme,
            memo: HashMap::new(),
        }
    }

    /// Expected extra codewords per step from a given context.
    pub fn expectation(&mut self, vector: &[u32], context: &[u32]) -> f64 {
        let vector = normalize(vector);
        self.expectation_sorted(&vector, context)
    }

    /// Context-weighted expectation of one fixed vector.
    pub fn complete_expectation(&mut self, vector: &[u32]) -> f64 {
        let vector = normalize(vector);
        let contexts: Vec<(Gram, f64)> = self
            .scheme
            .contexts()
            .map(|(c, p)| (c.clone(), p))
            .collect();

        contexts
            .iter()
            .map(|(context, p)| p * self.expectation_sorted(&vector, context))
            .sum()
    }

    /// Context-weighted expectation when each context uses its own vector.
    ///
    /// Contexts missing from `table` use `backup`.
    pub fn complete_expectation_with_table(
        &mut self,
        table: &HashMap<Gram, Candidates>,
        backup: &[u32],
    ) -> f64 {
        let contexts: Vec<(Gram, f64)> = self
            .scheme
            .contexts()
            .map(|(c, p)| (c.clone(), p))
            .collect();

        contexts
            .iter()
            .map(|(context, p)| {
                let vector = normalize(table.get(context).map_or(backup, |v| v.as_slice()));
                p * self.expectation_sorted(&vector, context)
            })
            .sum()
    }

    fn expectation_sorted(&mut self, vector: &[u32], context: &[u32]) -> f64 {
        if vector.is_empty() {
            return 0.0;
        }
        let key = (vector.to_vec(), Gram::from_slice(context));
        if let Some(&cached) = self.memo.get(&key) {
            return cached;
        }

        let mut result = 0.0;
        for i in 0..vector.len() {
            let p = self.scheme.p(vector[i], context);
            if p > 0.0 {
                let next = self.shift(context, vector[i]);
                result += p * (1.0 + self.expectation_sorted(&relative_to(vector, i), &next));
            }
        }

        self.memo.insert(key, result);
        result
    }

    fn shift(&self, context: &[u32], length: u32) -> Gram {
        let order = self.scheme.order();
        if order == 0 {
            return Gram::new();
        }
        let skip = (context.len() + 1).saturating_sub(order);
        context
            .iter()
            .copied()
            .chain(std::iter::once(length))
            .skip(skip)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kgram::KGramModel;

    fn dist() -> LengthDistribution {
        LengthDistribution::from_weights([(1, 0.5), (2, 0.25), (3, 0.25)]).unwrap()
    }

    #[test]
    fn test_single_length() {
        let d = dist();
        let mut rate = ContextFreeRate::new(&d);
        assert!((rate.expectation(&[1]) - 0.5).abs() < 1e-12);
        assert!((rate.total_rate(&[2]) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_chained_lengths() {
        // 0.5 * (1 + E([1])) + 0.25 * 1 = 1.0
        let d = dist();
        let mut rate = ContextFreeRate::new(&d);
        assert!((rate.expectation(&[1, 2]) - 1.0).abs() < 1e-12);
        // Order and duplicates do not matter
        assert!((rate.expectation(&[2, 1, 2]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_lengths_contribute_nothing() {
        let d = dist();
        let mut rate = ContextFreeRate::new(&d);
        assert_eq!(rate.expectation(&[7, 9]), 0.0);
        assert_eq!(rate.expectation(&[]), 0.0);
    }

    #[test]
    fn test_order_zero_matches_context_free() {
        let lengths = [1, 1, 2, 3, 1, 2, 1, 3];
        let model = KGramModel::train(1, &lengths).unwrap();
        let scheme = ConditionalScheme::new(&model);
        let d = crate::distribution::ExactLengths::new(&lengths);
        let d = crate::distribution::LengthSource::distribution(&d).unwrap();

        let mut free = ContextFreeRate::new(&d);
        let mut conditional = ConditionalRate::new(&scheme);
        for vector in [[1u32, 2], [1, 3], [2, 3]] {
            let a = free.expectation(&vector);
            let b = conditional.complete_expectation(&vector);
            assert!((a - b).abs() < 1e-12, "{:?}: {} vs {}", vector, a, b);
        }
    }

    #[test]
    fn test_deterministic_alternation() {
        // 1, 2, 1, 2, ... : after 1 always 2, after 2 always 1
        let lengths: Vec<u32> = (0..100).map(|i| 1 + (i % 2)).collect();
        let model = KGramModel::train(2, &lengths).unwrap();
        let scheme = ConditionalScheme::new(&model);
        let mut rate = ConditionalRate::new(&scheme);

        // From context [1] the codeword is 2, then at relative offset 1 the
        // next is 1: both hypotheses confirm
        assert!((rate.expectation(&[2, 3], &[1]) - 2.0).abs() < 1e-12);

        let table = scheme.assignment_table(1);
        let e = rate.complete_expectation_with_table(&table, &[1]);
        assert!((e - 1.0).abs() < 1e-12);
    }
}
