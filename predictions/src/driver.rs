// should partition data to training and test data
// fit the pipeline and evaluate it on test data
// evaluation should be equal for all pipelines
use common::{Dataset, PriceError, PriceResult};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use crate::{Evaluator, Pipeline};

const RNG_SEED: [u8; 16] = *b"0123456789abcdef";
/// Share of rows [Driver::drive] uses for fitting.
pub const TRAINING_RATIO: f64 = 0.8;

/// This function will shuffle the row indices `0..n` and split them into two parts.
///
/// # Returns
/// The first part contains about 80% randomly selected indices in a random order.
/// The second part contains all the remaining indices, *without* a guarantee about their order.
fn split_indices_randomly(n: usize) -> (Vec<usize>, Vec<usize>) {
    let mut rng = XorShiftRng::from_seed(RNG_SEED);
    let training_amount = (TRAINING_RATIO * (n as f64)) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    let (training, validation) = indices.partial_shuffle(&mut rng, training_amount);
    (training.to_vec(), validation.to_vec())
}

/// This struct can be used to compose a pipeline and an evaluator.
/// The main function on this struct is [drive](Driver::drive),
/// which will evaluate a pipeline on a given dataset.
pub struct Driver<'p, 'e, P: Pipeline, E: Evaluator> {
    pipeline: &'p P,
    evaluator: &'e E,
}

impl<'p, 'e, P: Pipeline, E: Evaluator> Driver<'p, 'e, P, E> {
    /// This creates a new Driver from the given `pipeline` and `evaluator`.
    pub fn with(pipeline: &'p P, evaluator: &'e E) -> Self {
        Self {
            pipeline,
            evaluator,
        }
    }

    fn drive_inner(
        &self,
        training_data: &Dataset,
        validation_data: &Dataset,
    ) -> PriceResult<(P::State, E::Output)> {
        log::info!("fitting (n={})...", training_data.len());
        let state = self
            .pipeline
            .fit(&training_data.features, &training_data.targets)
            .map_err(PriceError::rethrow_unless_input_error("Fitting failed"))?;
        log::info!("fitting... DONE");

        log::info!("evaluating (n={})...", validation_data.len());
        let output = self
            .pipeline
            .evaluate(
                &state,
                &validation_data.features,
                &validation_data.targets,
                self.evaluator,
            )
            .map_err(PriceError::rethrow_unless_input_error("Evaluation failed"))?;
        log::info!("evaluating... DONE");
        Ok((state, output))
    }

    /// This function randomly splits `data` into training data and validation data.
    /// The pipeline is then fit on the training part and evaluated on the validation part.
    ///
    /// Currently around 80% of data will be used as training data and the remaining 20% will be
    /// used as validation data. To split the data a fixed seed is used to ensure determinability.
    ///
    /// # Returns
    /// The fitted state together with the evaluation output, or an `Err` if either part would be
    /// empty.
    pub fn drive(&self, data: &Dataset) -> PriceResult<(P::State, E::Output)> {
        let (training, validation) = split_indices_randomly(data.len());
        if training.is_empty() || validation.is_empty() {
            return Err(format!(
                "{} rows are not enough to split into training and validation data",
                data.len()
            )
            .into());
        }
        self.drive_inner(&data.select_rows(&training), &data.select_rows(&validation))
    }

    /// Like [drive](Driver::drive), but all data will be used for fitting *as well as*
    /// validation.
    /// The evaluation is an in-sample one, use it to fit the final model.
    pub fn drive_full(&self, data: &Dataset) -> PriceResult<(P::State, E::Output)> {
        self.drive_inner(data, data)
    }
}
