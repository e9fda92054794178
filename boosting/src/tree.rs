use std::cmp::Ordering;

use common::FeatureMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::GbmParams;

/// A node of a [RegressionTree].
/// Rows with `value <= threshold` go left, everything else goes right, including NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A binary regression tree stored as a flat list of nodes, the root is at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Gives the output of this tree for one row of features.
    /// # Panics
    /// If `row` is shorter than the largest feature index used in a split.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Gives all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Gives the number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Gives the largest feature index used in a split.
    pub(crate) fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .max()
    }

    /// Grows a tree on the rows at `rows`, fitting the negative `gradients`.
    /// Only the given `features` are considered for splits.
    pub(crate) fn grow(
        matrix: &FeatureMatrix,
        gradients: &[f64],
        rows: Vec<usize>,
        features: &[usize],
        params: &GbmParams,
    ) -> Self {
        let mut grower = TreeGrower {
            matrix,
            gradients,
            features,
            params,
            nodes: Vec::new(),
        };
        grower.grow_node(rows, 0);
        Self {
            nodes: grower.nodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl SplitCandidate {
    /// Higher gain wins, ties go to the lower feature index.
    /// This is a total order, so the parallel reduction does not depend on scheduling.
    fn better(self, other: Self) -> Self {
        match self.gain.partial_cmp(&other.gain) {
            Some(Ordering::Greater) => self,
            Some(Ordering::Less) => other,
            _ => {
                if self.feature <= other.feature {
                    self
                } else {
                    other
                }
            }
        }
    }
}

struct TreeGrower<'a> {
    matrix: &'a FeatureMatrix,
    gradients: &'a [f64],
    features: &'a [usize],
    params: &'a GbmParams,
    nodes: Vec<Node>,
}

impl<'a> TreeGrower<'a> {
    fn leaf_value(&self, gradient_sum: f64, hessian_sum: f64) -> f64 {
        -gradient_sum / (hessian_sum + self.params.reg_lambda)
    }

    fn score(&self, gradient_sum: f64, hessian_sum: f64) -> f64 {
        gradient_sum * gradient_sum / (hessian_sum + self.params.reg_lambda)
    }

    fn gain(&self, left: (f64, f64), right: (f64, f64), parent: (f64, f64)) -> f64 {
        0.5 * (self.score(left.0, left.1) + self.score(right.0, right.1)
            - self.score(parent.0, parent.1))
            - self.params.gamma
    }

    fn grow_node(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let gradient_sum: f64 = rows.iter().map(|&row| self.gradients[row]).sum();
        // squared error has a hessian of 1 per row
        let hessian_sum = rows.len() as f64;
        self.nodes.push(Node::Leaf {
            value: self.leaf_value(gradient_sum, hessian_sum),
        });

        if depth >= self.params.max_depth || rows.len() < self.params.min_samples_split.max(2) {
            return idx;
        }

        let candidate = match self.best_split(&rows, (gradient_sum, hessian_sum)) {
            Some(candidate) => candidate,
            None => return idx,
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| self.matrix.get(row, candidate.feature) <= candidate.threshold);

        let left = self.grow_node(left_rows, depth + 1);
        let right = self.grow_node(right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: candidate.feature,
            threshold: candidate.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], parent: (f64, f64)) -> Option<SplitCandidate> {
        self.features
            .par_iter()
            .filter_map(|&feature| self.best_split_of_feature(rows, feature, parent))
            .reduce_with(SplitCandidate::better)
            .filter(|candidate| candidate.gain > 0.0)
    }

    fn best_split_of_feature(
        &self,
        rows: &[usize],
        feature: usize,
        parent: (f64, f64),
    ) -> Option<SplitCandidate> {
        let mut present: Vec<(f64, f64)> = rows
            .iter()
            .map(|&row| (self.matrix.get(row, feature), self.gradients[row]))
            .filter(|(value, _)| !value.is_nan())
            .collect();
        present.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let min_child_weight = self.params.min_child_weight;
        let mut best: Option<SplitCandidate> = None;
        let mut left = (0.0, 0.0);
        for window in present.windows(2) {
            let (current, gradient) = window[0];
            let (next, _) = window[1];
            left = (left.0 + gradient, left.1 + 1.0);
            if current >= next {
                continue;
            }
            let right = (parent.0 - left.0, parent.1 - left.1);
            if left.1 < min_child_weight || right.1 < min_child_weight {
                continue;
            }
            let midpoint = current + (next - current) / 2.0;
            let candidate = SplitCandidate {
                feature,
                // rounding may push the midpoint onto `next`
                threshold: if midpoint < next { midpoint } else { current },
                gain: self.gain(left, right, parent),
            };
            best = Some(match best {
                Some(best) if best.gain >= candidate.gain => best,
                _ => candidate,
            });
        }
        best
    }
}
