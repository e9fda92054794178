use common::PriceResult;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Hyperparameters of a [GradientBoostedRegressor](crate::GradientBoostedRegressor).
/// Every field has a default, so configuration files only need to name what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct GbmParams {
    /// Number of trees.
    pub n_estimators: usize,
    /// Shrinkage applied to the output of every tree.
    pub learning_rate: f64,
    /// Maximum depth of a tree, a single leaf has depth 0.
    pub max_depth: usize,
    /// Share of rows drawn without replacement for each tree.
    pub subsample: f64,
    /// Share of features drawn without replacement for each tree.
    pub colsample_bytree: f64,
    /// Minimum sum of hessians in a child. With squared error this is a row count.
    pub min_child_weight: f64,
    /// Minimum number of rows in a node to consider splitting it.
    pub min_samples_split: usize,
    /// L2 regularization on leaf weights.
    pub reg_lambda: f64,
    /// Minimum gain for a split to be made.
    pub gamma: f64,
    /// Seed of all random sampling.
    pub random_state: u64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 600,
            learning_rate: 0.05,
            max_depth: 8,
            subsample: 1.0,
            colsample_bytree: 0.6,
            min_child_weight: 5.0,
            min_samples_split: 2,
            reg_lambda: 1.0,
            gamma: 0.0,
            random_state: 888,
        }
    }
}

fn is_share(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

impl GbmParams {
    /// Checks that all parameters lie in their valid ranges.
    pub fn validate(&self) -> PriceResult<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(format!("learning_rate must be positive, got {}", self.learning_rate).into());
        }
        if !is_share(self.subsample) {
            return Err(format!("subsample must lie in (0, 1], got {}", self.subsample).into());
        }
        if !is_share(self.colsample_bytree) {
            return Err(format!(
                "colsample_bytree must lie in (0, 1], got {}",
                self.colsample_bytree
            )
            .into());
        }
        if self.min_child_weight < 0.0 || self.reg_lambda < 0.0 || self.gamma < 0.0 {
            return Err("min_child_weight, reg_lambda and gamma must not be negative".into());
        }
        Ok(())
    }

    pub(crate) fn sample_size(share: f64, total: usize) -> usize {
        ((share * total as f64).round() as usize).clamp(1, total.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_from_defaults() {
        let params = GbmParamsBuilder::default()
            .n_estimators(10usize)
            .build()
            .unwrap();

        assert_eq!(params.n_estimators, 10);
        assert_eq!(params.max_depth, 8);
        assert_eq!(params.random_state, 888);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: GbmParams = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
        assert_eq!(params.max_depth, 3);
        assert_eq!(params.colsample_bytree, 0.6);
    }

    #[test]
    fn invalid_shares_are_rejected() {
        let mut params = GbmParams::default();
        params.subsample = 0.0;
        assert!(params.validate().is_err());

        let mut params = GbmParams::default();
        params.colsample_bytree = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn sample_size_is_at_least_one() {
        assert_eq!(GbmParams::sample_size(0.6, 14), 8);
        assert_eq!(GbmParams::sample_size(0.01, 3), 1);
        assert_eq!(GbmParams::sample_size(1.0, 14), 14);
    }
}
