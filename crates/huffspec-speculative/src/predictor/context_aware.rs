//! Context-aware predictor: order-k Markov conditioning on committed lengths.

use crate::kgram::{ConditionalScheme, Gram, KGramModel};
use huffspec_core::{Candidates, Context, Error, LengthPredictor, Result};
use std::collections::HashMap;
use tracing::debug;

/// Looks up a candidate vector for the last `k` committed codeword lengths.
///
/// Contexts never seen in training fall back to the globally most frequent
/// lengths.
#[derive(Debug, Clone)]
pub struct ContextAwarePredictor {
    order: usize,
    width: usize,
    table: HashMap<Gram, Candidates>,
    backup: Candidates,
    initial: Gram,
}

impl ContextAwarePredictor {
    /// Train an order-`order` model on a reference length sequence.
    ///
    /// A sequence shorter than `order + 1` trains no context; every
    /// prediction then uses the backup vector.
    pub fn train(order: usize, lengths: &[u32], width: usize) -> Result<Self> {
        let model = KGramModel::train(order + 1, lengths)?;
        Self::from_scheme(&ConditionalScheme::new(&model), width)
    }

    /// Build the assignment table of a trained scheme.
    ///
    /// # Errors
    /// `Config` if `width` is 0 or the scheme saw no lengths at all.
    pub fn from_scheme(scheme: &ConditionalScheme, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::config("speculation_width must be at least 1"));
        }

        let table = scheme.assignment_table(width);
        let mut backup: Candidates = scheme.most_frequent_outcomes(width).into_iter().collect();
        if backup.is_empty() {
            return Err(Error::config("training length sequence is empty"));
        }
        backup.sort_unstable();
        let initial: Gram = scheme
            .most_frequent_outcomes(scheme.order())
            .into_iter()
            .collect();

        debug!(
            "Context-aware predictor: order {}, {} contexts, backup {:?}",
            scheme.order(),
            table.len(),
            backup
        );

        Ok(Self {
            order: scheme.order(),
            width,
            table,
            backup,
            initial,
        })
    }

    /// Model order k.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Candidate vector per trained context.
    pub fn assignment_table(&self) -> &HashMap<Gram, Candidates> {
        &self.table
    }

    /// Vector used for unseen contexts.
    pub fn backup(&self) -> &[u32] {
        &self.backup
    }
}

impl LengthPredictor for ContextAwarePredictor {
    fn name(&self) -> &'static str {
        "context-aware"
    }

    #[inline]
    fn predict(&self, _frontier: usize, context: &Context) -> Candidates {
        self.table
            .get(context.as_slice())
            .unwrap_or(&self.backup)
            .clone()
    }

    fn width(&self) -> usize {
        self.width
    }

    fn initial_context(&self) -> Context {
        Context::with_seed(self.order, &self.initial)
    }

    fn cardinality(&self) -> usize {
        self.table.len()
    }
}
