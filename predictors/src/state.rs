use std::path::Path;

use boosting::GradientBoostedRegressor;
use common::{
    util::{read_deserializable_from_json, write_serializable_to_json},
    PriceError, PriceResult,
};
use encoders::{FittedLabelEncoder, FittedNumericImputer, FittedStateEncoder};
use serde::{Deserialize, Serialize};

/// Everything a [GbmPricePipeline](crate::GbmPricePipeline) learns during fit.
///
/// The state is immutable once fit and holds no handles, so it can be shared between threads
/// (e.g. behind an `Arc`) and persisted as a single json document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedEncodingState {
    pub(crate) imputer: FittedNumericImputer,
    pub(crate) state_encoder: FittedStateEncoder,
    pub(crate) label_encoder: FittedLabelEncoder,
    /// The names of the regressor inputs, in the order the regressor expects them.
    pub(crate) feature_cols: Vec<String>,
    pub(crate) log_target: bool,
    pub(crate) regressor: GradientBoostedRegressor,
}

impl FittedEncodingState {
    /// Gives the names of the regressor inputs, in the order the regressor expects them.
    pub fn feature_cols(&self) -> &[String] {
        &self.feature_cols
    }

    /// Was the regressor fit on log prices?
    pub fn log_target(&self) -> bool {
        self.log_target
    }

    /// Gives the learned imputation means.
    pub fn imputer(&self) -> &FittedNumericImputer {
        &self.imputer
    }

    /// Gives the learned codes of the nominal columns.
    pub fn label_encoder(&self) -> &FittedLabelEncoder {
        &self.label_encoder
    }

    /// Gives the fitted regressor.
    pub fn regressor(&self) -> &GradientBoostedRegressor {
        &self.regressor
    }

    /// Writes this state as json to `path`, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PriceResult<()> {
        log::info!("saving fitted state to {}", path.as_ref().display());
        write_serializable_to_json(self, path)
    }

    /// Reads a state written by [save](FittedEncodingState::save).
    /// # Returns
    /// - A [PriceError::Inference] if the file can't be read, is corrupt, or describes a state
    ///   that can't be used for prediction.
    pub fn load<P: AsRef<Path>>(path: P) -> PriceResult<Self> {
        log::info!("loading fitted state from {}", path.as_ref().display());
        let state: Self = read_deserializable_from_json(path)
            .map_err(|err| PriceError::Inference(format!("could not read fitted state: {}", err)))?;
        state.check_consistency()?;
        Ok(state)
    }

    fn check_consistency(&self) -> PriceResult<()> {
        self.regressor
            .check_consistency()
            .map_err(|err| PriceError::Inference(format!("fitted state is unusable: {}", err)))?;
        if self.feature_cols.len() != self.regressor.n_features() {
            return Err(PriceError::Inference(format!(
                "fitted state names {} features but the regressor expects {}",
                self.feature_cols.len(),
                self.regressor.n_features()
            )));
        }
        Ok(())
    }
}
