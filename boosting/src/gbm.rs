use common::{FeatureMatrix, PriceError, PriceResult};
use rand::{seq::index, SeedableRng};
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{GbmParams, Node, RegressionTree};

/// An additive ensemble of regression trees trained on squared error.
/// The prediction is the mean training target plus the shrunken output of every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    base_score: f64,
    learning_rate: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

fn root_mean_squared_error(predictions: &[f64], targets: &[f64]) -> f64 {
    let sum: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(prediction, target)| (prediction - target).powi(2))
        .sum();
    (sum / targets.len() as f64).sqrt()
}

impl GradientBoostedRegressor {
    /// Trains a new regressor.
    /// # Returns
    /// - An `Err` if there are no rows, the number of targets does not match, a target is not
    ///   finite or the parameters are invalid.
    pub fn fit(params: &GbmParams, features: &FeatureMatrix, targets: &[f64]) -> PriceResult<Self> {
        params.validate()?;
        if features.n_rows() != targets.len() {
            return Err(PriceError::Shape(format!(
                "{} feature rows but {} targets",
                features.n_rows(),
                targets.len()
            )));
        }
        if targets.is_empty() {
            return Err("can not fit a regressor without training data".into());
        }
        if features.n_columns() == 0 {
            return Err("can not fit a regressor without features".into());
        }
        if let Some(target) = targets.iter().find(|target| !target.is_finite()) {
            return Err(format!("training target {} is not finite", target).into());
        }

        let n_rows = targets.len();
        let n_features = features.n_columns();
        let base_score = targets.iter().sum::<f64>() / n_rows as f64;
        log::info!(
            "fitting {} trees on {} rows with {} features",
            params.n_estimators,
            n_rows,
            n_features
        );

        let mut rng = XorShiftRng::seed_from_u64(params.random_state);
        let row_sample_size = GbmParams::sample_size(params.subsample, n_rows);
        let feature_sample_size = GbmParams::sample_size(params.colsample_bytree, n_features);

        let mut predictions = vec![base_score; n_rows];
        let mut gradients = vec![0.0; n_rows];
        let mut trees = Vec::with_capacity(params.n_estimators);
        for round in 0..params.n_estimators {
            gradients
                .par_iter_mut()
                .zip(predictions.par_iter().zip(targets.par_iter()))
                .for_each(|(gradient, (prediction, target))| *gradient = prediction - target);

            let rows = if row_sample_size < n_rows {
                let mut rows = index::sample(&mut rng, n_rows, row_sample_size).into_vec();
                rows.sort_unstable();
                rows
            } else {
                (0..n_rows).collect()
            };
            let mut sampled_features =
                index::sample(&mut rng, n_features, feature_sample_size).into_vec();
            sampled_features.sort_unstable();

            let tree =
                RegressionTree::grow(features, &gradients, rows, &sampled_features, params);
            predictions
                .par_iter_mut()
                .enumerate()
                .for_each(|(row, prediction)| {
                    *prediction += params.learning_rate * tree.predict_row(features.row(row))
                });
            trees.push(tree);

            if (round + 1) % 100 == 0 {
                log::debug!(
                    "round {}: training rmse {:.2}",
                    round + 1,
                    root_mean_squared_error(&predictions, targets)
                );
            }
        }
        log::info!(
            "finished fitting, training rmse {:.2}",
            root_mean_squared_error(&predictions, targets)
        );

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            n_features,
            trees,
        })
    }

    /// Gives the prediction for a single row.
    /// # Returns
    /// - A shape error if the row does not have the number of features seen during fit.
    pub fn predict_row(&self, row: &[f64]) -> PriceResult<f64> {
        if row.len() != self.n_features {
            return Err(PriceError::Shape(format!(
                "row has {} features, the regressor was fit on {}",
                row.len(),
                self.n_features
            )));
        }
        Ok(self.base_score
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>())
    }

    /// Gives one prediction per row of `matrix`, rows are processed in parallel.
    pub fn predict(&self, matrix: &FeatureMatrix) -> PriceResult<Vec<f64>> {
        if matrix.n_rows() > 0 && matrix.n_columns() != self.n_features {
            return Err(PriceError::Shape(format!(
                "matrix has {} features, the regressor was fit on {}",
                matrix.n_columns(),
                self.n_features
            )));
        }
        (0..matrix.n_rows())
            .into_par_iter()
            .map(|row| self.predict_row(matrix.row(row)))
            .collect()
    }

    /// Checks that a deserialized regressor is usable.
    /// # Returns
    /// - An `Err` if a tree refers to a feature or node which does not exist.
    pub fn check_consistency(&self) -> PriceResult<()> {
        for tree in &self.trees {
            if let Some(feature) = tree.max_feature() {
                if feature >= self.n_features {
                    return Err(format!(
                        "tree splits on feature {} but there are only {}",
                        feature, self.n_features
                    )
                    .into());
                }
            }
            let n_nodes = tree.nodes().len();
            // children are always stored after their parent
            let dangling = tree.nodes().iter().enumerate().any(|(idx, node)| match node {
                Node::Split { left, right, .. } => {
                    !(idx < *left && *left < n_nodes && idx < *right && *right < n_nodes)
                }
                Node::Leaf { .. } => false,
            });
            if n_nodes == 0 || dangling {
                return Err("tree refers to a node which does not exist".into());
            }
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err("base score and learning rate must be finite".into());
        }
        Ok(())
    }

    /// Gives the number of trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Gives the number of features every row needs.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Gives the constant all trees correct.
    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}
