//! k-gram statistics over codeword lengths.
//!
//! A [`KGramModel`] of size `k + 1` counts every window of `k + 1`
//! consecutive lengths. [`ConditionalScheme`] turns those counts into
//! `P(length | previous k lengths)` and the per-context assignment table the
//! context-aware predictor looks up at decode time.

use huffspec_core::{Candidates, Error, Result};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

/// A window of consecutive codeword lengths.
pub type Gram = SmallVec<[u32; 8]>;

/// Frequencies of fixed-size windows over a length sequence.
#[derive(Debug, Clone, Default)]
pub struct KGramModel {
    size: usize,
    frequencies: HashMap<Gram, u64>,
    outcome_frequencies: HashMap<u32, u64>,
}

impl KGramModel {
    /// Create an untrained model counting windows of `size` lengths.
    ///
    /// # Errors
    /// `Config` if `size` is 0.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::config("k-gram size must be at least 1"));
        }
        Ok(Self {
            size,
            ..Default::default()
        })
    }

    /// Create and train a model in one go.
    pub fn train(size: usize, lengths: &[u32]) -> Result<Self> {
        let mut model = Self::new(size)?;
        model.feed_all(lengths);
        Ok(model)
    }

    /// Count every window of a length sequence.
    pub fn feed_all(&mut self, lengths: &[u32]) {
        let mut window: VecDeque<u32> = VecDeque::with_capacity(self.size);

        for &length in lengths {
            *self.outcome_frequencies.entry(length).or_insert(0) += 1;

            if window.len() == self.size {
                window.pop_front();
            }
            window.push_back(length);

            if window.len() == self.size {
                let gram: Gram = window.iter().copied().collect();
                *self.frequencies.entry(gram).or_insert(0) += 1;
            }
        }

        debug!(
            "Trained {}-gram model: {} lengths, {} distinct windows",
            self.size,
            lengths.len(),
            self.frequencies.len()
        );
    }

    /// Window size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Window counts.
    pub fn frequencies(&self) -> &HashMap<Gram, u64> {
        &self.frequencies
    }

    /// Number of distinct lengths seen.
    pub fn number_of_outcomes(&self) -> usize {
        self.outcome_frequencies.len()
    }

    /// The `n` most frequent lengths; ties rank the shorter length first.
    pub fn most_frequent_outcomes(&self, n: usize) -> Vec<u32> {
        let mut outcomes: Vec<(u32, u64)> = self
            .outcome_frequencies
            .iter()
            .map(|(&l, &c)| (l, c))
            .collect();
        outcomes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        outcomes.into_iter().take(n).map(|(l, _)| l).collect()
    }
}

/// Conditional length probabilities keyed by the preceding `k` lengths.
#[derive(Debug, Clone)]
pub struct ConditionalScheme {
    order: usize,
    conditional: HashMap<Gram, BTreeMap<u32, f64>>,
    context_probability: HashMap<Gram, f64>,
    ranked_outcomes: Vec<u32>,
}

impl ConditionalScheme {
    /// Derive conditional probabilities from a trained model.
    ///
    /// A model that never saw a complete window yields a scheme with no
    /// contexts; only the global outcome ranking is available then.
    pub fn new(model: &KGramModel) -> Self {
        let mut conditional: HashMap<Gram, BTreeMap<u32, f64>> = HashMap::new();
        let mut context_count: HashMap<Gram, u64> = HashMap::new();
        let mut total = 0u64;

        for (gram, &count) in model.frequencies() {
            let (&outcome, context) = match gram.split_last() {
                Some(parts) => parts,
                None => continue,
            };
            let context: Gram = context.iter().copied().collect();

            *conditional
                .entry(context.clone())
                .or_default()
                .entry(outcome)
                .or_insert(0.0) += count as f64;
            *context_count.entry(context).or_insert(0) += count;
            total += count;
        }

        if total == 0 {
            debug!(
                "No complete {}-gram window, conditional scheme is empty",
                model.size()
            );
        }

        let mut context_probability = HashMap::with_capacity(context_count.len());
        for (context, outcomes) in conditional.iter_mut() {
            let count = context_count.get(context).copied().unwrap_or(1) as f64;
            for p in outcomes.values_mut() {
                *p /= count;
            }
            context_probability.insert(context.clone(), count / total as f64);
        }

        Self {
            order: model.size() - 1,
            conditional,
            context_probability,
            ranked_outcomes: model.most_frequent_outcomes(model.number_of_outcomes()),
        }
    }

    /// Context length k.
    pub fn order(&self) -> usize {
        self.order
    }

    /// `P(outcome | context)`, 0 for unseen contexts.
    pub fn p(&self, outcome: u32, context: &[u32]) -> f64 {
        self.conditional
            .get(context)
            .and_then(|outcomes| outcomes.get(&outcome))
            .copied()
            .unwrap_or(0.0)
    }

    /// `P(context)` over all observed windows.
    pub fn p_context(&self, context: &[u32]) -> f64 {
        self.context_probability.get(context).copied().unwrap_or(0.0)
    }

    /// Observed contexts with their probabilities.
    pub fn contexts(&self) -> impl Iterator<Item = (&Gram, f64)> + '_ {
        self.context_probability.iter().map(|(c, &p)| (c, p))
    }

    /// Number of observed contexts.
    pub fn context_count(&self) -> usize {
        self.conditional.len()
    }

    /// Check if no context was observed.
    pub fn is_empty(&self) -> bool {
        self.conditional.is_empty()
    }

    /// The `n` globally most frequent lengths.
    pub fn most_frequent_outcomes(&self, n: usize) -> Vec<u32> {
        self.ranked_outcomes.iter().copied().take(n).collect()
    }

    /// The `n` most probable lengths after `context`.
    pub fn most_frequent_on_context(&self, n: usize, context: &[u32]) -> Vec<u32> {
        let Some(outcomes) = self.conditional.get(context) else {
            return Vec::new();
        };
        let mut ranked: Vec<(u32, f64)> = outcomes.iter().map(|(&l, &p)| (l, p)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(n).map(|(l, _)| l).collect()
    }

    /// Candidate vector per observed context.
    ///
    /// Each entry holds the `n` most probable lengths for that context,
    /// padded with globally frequent lengths when the context saw fewer,
    /// stored ascending.
    pub fn assignment_table(&self, n: usize) -> HashMap<Gram, Candidates> {
        let mut table = HashMap::with_capacity(self.conditional.len());

        for context in self.conditional.keys() {
            let mut vector: Candidates = self
                .most_frequent_on_context(n, context)
                .into_iter()
                .collect();
            for &outcome in &self.ranked_outcomes {
                if vector.len() >= n {
                    break;
                }
                if !vector.contains(&outcome) {
                    vector.push(outcome);
                }
            }
            vector.sort_unstable();
            table.insert(context.clone(), vector);
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_window() {
        let model = KGramModel::train(2, &[1, 2, 1, 2, 1]).unwrap();
        let freq = model.frequencies();

        assert_eq!(freq.get(&Gram::from_slice(&[1, 2])), Some(&2));
        assert_eq!(freq.get(&Gram::from_slice(&[2, 1])), Some(&2));
        assert_eq!(freq.values().sum::<u64>(), 4);
        assert_eq!(model.number_of_outcomes(), 2);
    }

    #[test]
    fn test_most_frequent_outcomes() {
        let model = KGramModel::train(1, &[3, 3, 3, 4, 4, 5, 2, 2]).unwrap();
        assert_eq!(model.most_frequent_outcomes(3), vec![3, 2, 4]);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(KGramModel::new(0).is_err());
    }

    #[test]
    fn test_conditional_probabilities() {
        // After 1: 2 twice, 3 once
        let model = KGramModel::train(2, &[1, 2, 1, 2, 1, 3]).unwrap();
        let scheme = ConditionalScheme::new(&model);

        assert_eq!(scheme.order(), 1);
        assert!((scheme.p(2, &[1]) - 2.0 / 3.0).abs() < 1e-12);
        assert!((scheme.p(3, &[1]) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(scheme.p(1, &[1]), 0.0);
        assert_eq!(scheme.p(1, &[9]), 0.0);
        assert!((scheme.p_context(&[1]) - 0.6).abs() < 1e-12);
        assert!((scheme.p_context(&[2]) - 0.4).abs() < 1e-12);

        let total: f64 = scheme.contexts().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_assignment_table_pads_with_global() {
        let model = KGramModel::train(2, &[1, 2, 1, 2, 1, 3]).unwrap();
        let scheme = ConditionalScheme::new(&model);
        let table = scheme.assignment_table(2);

        assert_eq!(table[&Gram::from_slice(&[1])].as_slice(), &[2, 3]);
        // Context [2] only ever saw 1; padded with the most frequent other
        assert_eq!(table[&Gram::from_slice(&[2])].as_slice(), &[1, 2]);
    }

    #[test]
    fn test_order_zero_scheme() {
        let model = KGramModel::train(1, &[5, 5, 6]).unwrap();
        let scheme = ConditionalScheme::new(&model);

        assert_eq!(scheme.order(), 0);
        assert!((scheme.p(5, &[]) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(scheme.assignment_table(1)[&Gram::new()].as_slice(), &[5]);
    }

    #[test]
    fn test_short_sequence_gives_empty_scheme() {
        let model = KGramModel::train(4, &[1, 2, 2]).unwrap();
        let scheme = ConditionalScheme::new(&model);

        assert!(scheme.is_empty());
        assert_eq!(scheme.contexts().count(), 0);
        assert!(scheme.assignment_table(2).is_empty());
        assert_eq!(scheme.most_frequent_outcomes(2), vec![2, 1]);
        assert_eq!(scheme.order(), 3);
    }
}
