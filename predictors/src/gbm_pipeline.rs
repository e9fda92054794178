use boosting::GradientBoostedRegressor;
use common::{columns, FeatureMatrix, Fit, Frame, PriceError, PriceResult, Transform};
use encoders::{
    FittedLabelEncoder, FittedNumericImputer, FittedStateEncoder, LabelEncoder, NumericImputer,
    StateEncoder,
};
use predictions::Pipeline;

use crate::{features, target, FittedEncodingState, PipelineConfig};

/// Predicts prices with a gradient boosted tree ensemble.
///
/// Before the regressor sees the data:
/// 1. missing numeric values are replaced by their training mean,
/// 2. the building state is replaced by its rank,
/// 3. type, subtype and province are replaced by integer codes.
///
/// The encoded categorical columns are dropped, the regressor sees the numeric columns followed by
/// the encoded ones.
#[derive(Debug, Clone, Default)]
pub struct GbmPricePipeline {
    config: PipelineConfig,
}

impl GbmPricePipeline {
    /// Creates a new pipeline using `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Gives the config this pipeline fits with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

fn encode(
    imputer: &FittedNumericImputer,
    state_encoder: &FittedStateEncoder,
    label_encoder: &FittedLabelEncoder,
    frame: &mut Frame,
) -> PriceResult<()> {
    imputer.transform(frame)?;
    state_encoder.transform(frame)?;
    label_encoder.transform(frame)?;

    frame.drop_column(state_encoder.input_column());
    for column in label_encoder.input_columns() {
        frame.drop_column(column);
    }
    Ok(())
}

impl Pipeline for GbmPricePipeline {
    type State = FittedEncodingState;

    fn fit(&self, features: &Frame, targets: &[f64]) -> PriceResult<Self::State> {
        if features.n_rows() != targets.len() {
            return Err(PriceError::Shape(format!(
                "{} feature rows but {} targets",
                features.n_rows(),
                targets.len()
            )));
        }
        // only the columns of a PropertyRecord can be served later
        columns::check_record_columns(features)?;

        let mut frame = features.clone();
        let imputer = NumericImputer::new().fit(&frame)?;
        let state_encoder = StateEncoder::default().fit(&frame)?;
        let label_encoder = LabelEncoder::default().fit(&frame)?;
        encode(&imputer, &state_encoder, &label_encoder, &mut frame)?;

        let feature_cols: Vec<String> = imputer
            .means()
            .iter()
            .map(|mean| mean.column.clone())
            .chain(std::iter::once(state_encoder.output_column()))
            .chain(label_encoder.output_columns())
            .collect();
        log::debug!("feature columns: {:?}", feature_cols);

        let matrix = features::assemble(&frame, &feature_cols)?;
        let transformed_targets: Vec<f64> = targets
            .iter()
            .map(|&price| target::forward(price, self.config.log_target))
            .collect();
        let regressor =
            GradientBoostedRegressor::fit(&self.config.gbm, &matrix, &transformed_targets)?;
        log::info!(
            "fitted {} trees on {} rows with {} features",
            regressor.n_trees(),
            matrix.n_rows(),
            matrix.n_columns()
        );

        Ok(FittedEncodingState {
            imputer,
            state_encoder,
            label_encoder,
            feature_cols,
            log_target: self.config.log_target,
            regressor,
        })
    }

    fn transform(&self, state: &Self::State, features: &Frame) -> PriceResult<FeatureMatrix> {
        let mut frame = features.clone();
        encode(
            &state.imputer,
            &state.state_encoder,
            &state.label_encoder,
            &mut frame,
        )?;
        features::assemble(&frame, &state.feature_cols)
    }

    fn predict(&self, state: &Self::State, features: &Frame) -> PriceResult<Vec<f64>> {
        let matrix = self.transform(state, features)?;
        state
            .regressor
            .predict(&matrix)?
            .into_iter()
            .map(|output| target::inverse(output, state.log_target))
            .collect()
    }
}
