//! Huffman code construction.
//!
//! Repeatedly merges the two lowest-weight nodes until one tree remains,
//! then reads each symbol's depth as its code length. Equal weights are
//! ordered by a sequence number assigned when the node enters the queue, so
//! leaves follow the statistics' entry order and merged nodes queue behind
//! everything already present.

use crate::stats::SymbolStats;
use crate::table::{CodeTable, MAX_CODE_LENGTH};
use huffspec_core::{Error, Result};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::debug;

/// Queue entry: a subtree root with its total weight.
#[derive(Debug, Clone, Copy)]
struct QueueItem {
    weight: f64,
    seq: usize,
    node: usize,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(usize),
    Internal(usize, usize),
}

/// Compute Huffman code lengths for the given weights.
///
/// # Errors
/// `CodeConstruction` if fewer than 2 weights are given or the tree is
/// deeper than [`MAX_CODE_LENGTH`].
pub fn huffman_code_lengths(weights: &[f64]) -> Result<Vec<u8>> {
    if weights.len() < 2 {
        return Err(Error::construction(
            "alphabet must contain at least 2 symbols",
        ));
    }

    let mut nodes: Vec<Node> = (0..weights.len()).map(Node::Leaf).collect();
    let mut queue: BinaryHeap<Reverse<QueueItem>> = weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| {
            Reverse(QueueItem {
                weight,
                seq: i,
                node: i,
            })
        })
        .collect();
    let mut seq = weights.len();

    while queue.len() > 1 {
        let (Some(Reverse(left)), Some(Reverse(right))) = (queue.pop(), queue.pop()) else {
            break;
        };

        nodes.push(Node::Internal(left.node, right.node));
        queue.push(Reverse(QueueItem {
            weight: left.weight + right.weight,
            seq,
            node: nodes.len() - 1,
        }));
        seq += 1;
    }

    let root = queue
        .pop()
        .map(|Reverse(item)| item.node)
        .ok_or_else(|| Error::construction("empty merge queue"))?;

    let mut lengths = vec![0u8; weights.len()];
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        match nodes[node] {
            Node::Leaf(symbol) => {
                if depth > MAX_CODE_LENGTH as usize {
                    return Err(Error::construction(format!(
                        "code length {} exceeds maximum {}",
                        depth, MAX_CODE_LENGTH
                    )));
                }
                lengths[symbol] = depth as u8;
            }
            Node::Internal(left, right) => {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
    }

    Ok(lengths)
}

/// Build a canonical code table from symbol statistics.
pub fn build(stats: &SymbolStats) -> Result<CodeTable> {
    let weights = stats.weights()?;
    let values: Vec<f64> = weights.iter().map(|&(_, w)| w).collect();
    let lengths = huffman_code_lengths(&values)?;

    let entries: Vec<_> = weights
        .iter()
        .zip(&lengths)
        .map(|(&(symbol, _), &len)| (symbol, len))
        .collect();

    let table = CodeTable::from_lengths(&entries)?;

    debug!(
        "Built prefix code: {} symbols, max length {} bits",
        table.symbol_count(),
        table.max_code_length()
    );

    Ok(table)
}

impl CodeTable {
    /// Build a canonical Huffman table from symbol statistics.
    pub fn build(stats: &SymbolStats) -> Result<Self> {
        build(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_lengths() {
        // 45, 13, 12, 16, 9, 5 -> 1, 3, 3, 3, 4, 4
        let lengths = huffman_code_lengths(&[45.0, 13.0, 12.0, 16.0, 9.0, 5.0]).unwrap();
        assert_eq!(lengths, vec![1, 3, 3, 3, 4, 4]);
    }

    #[test]
    fn test_two_symbols() {
        let lengths = huffman_code_lengths(&[1.0, 1000.0]).unwrap();
        assert_eq!(lengths, vec![1, 1]);
    }

    #[test]
    fn test_single_symbol_rejected() {
        assert!(huffman_code_lengths(&[3.0]).is_err());
        assert!(huffman_code_lengths(&[]).is_err());
    }

    #[test]
    fn test_equal_weights_balanced() {
        let lengths = huffman_code_lengths(&[1.0; 8]).unwrap();
        assert!(lengths.iter().all(|&l| l == 3));
    }

    #[test]
    fn test_deterministic_tie_break() {
        let a = huffman_code_lengths(&[1.0, 1.0, 2.0, 2.0, 4.0]).unwrap();
        let b = huffman_code_lengths(&[1.0, 1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_optimal_expected_length() {
        let weights = [0.4, 0.2, 0.2, 0.1, 0.1];
        let lengths = huffman_code_lengths(&weights).unwrap();
        let expected: f64 = weights
            .iter()
            .zip(&lengths)
            .map(|(w, &l)| w * l as f64)
            .sum();
        assert!((expected - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_build_from_counts() {
        let stats = SymbolStats::from_symbols(&[1, 1, 1, 1, 2, 2, 3, 4]);
        let table = CodeTable::build(&stats).unwrap();

        assert_eq!(table.symbol_count(), 4);
        assert_eq!(table.code_length(1), Some(1));
        assert_eq!(table.code_length(2), Some(2));
        assert!((table.kraft_sum() - 1.0).abs() < 1e-12);
        assert!(table.is_prefix_free());
    }

    #[test]
    fn test_build_from_probabilities_and_lengths_agree() {
        let from_p = CodeTable::build(&SymbolStats::Probabilities(vec![
            (0, 0.5),
            (1, 0.25),
            (2, 0.125),
            (3, 0.125),
        ]))
        .unwrap();
        let from_len = CodeTable::build(&SymbolStats::CodeLengths(vec![
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 3),
        ]))
        .unwrap();

        assert_eq!(from_p, from_len);
    }
}
