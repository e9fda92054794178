use std::path::Path;

use boosting::GbmParams;
use common::{PriceError, PriceResult};
use serde::{Deserialize, Serialize};

/// Configuration of a [GbmPricePipeline](crate::GbmPricePipeline).
/// Can be read from a dhall file, every field is optional there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fit the regressor on `ln(1 + price)` instead of the price.
    pub log_target: bool,
    /// Hyperparameters of the regressor.
    pub gbm: GbmParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_target: true,
            gbm: GbmParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a config from the dhall file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PriceResult<Self> {
        let config: Self = serde_dhall::from_file(path.as_ref())
            .parse()
            .map_err(|err| {
                PriceError::StringPriceError(format!(
                    "could not read pipeline config from {}: {}",
                    path.as_ref().display(),
                    err
                ))
            })?;
        config.gbm.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn dhall_config_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("pipeline_config_{}.dhall", std::process::id()));
        fs::write(
            &path,
            "{ log_target = False, gbm = { n_estimators = 50, learning_rate = 0.1 } }",
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(!config.log_target);
        assert_eq!(config.gbm.n_estimators, 50);
        assert_eq!(config.gbm.learning_rate, 0.1);
        assert_eq!(config.gbm.max_depth, GbmParams::default().max_depth);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/pipeline.dhall");
        assert_eq!(
            PipelineConfig::from_file(path).unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(PipelineConfig::from_file("/does/not/exist.dhall").is_err());
    }
}
