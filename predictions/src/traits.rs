use common::{FeatureMatrix, Frame, PriceError, PriceResult};

/// A **strategy** on how to define how *good* a pipeline performs.
pub trait Evaluator {
    /// Describes how *good* should be measured.
    /// If the output should get written to json, it must derive serde::Serialize
    /// This is not enforced here since not all output need to be written to json
    type Output;

    /// This function gets pairs of real price and predicted price (in this order) and should
    /// determine how well they match.
    /// If no pairs are provided an Error can be returned.
    /// Implementations may define additional failure conditions.
    fn evaluate(&self, pairs: impl IntoIterator<Item = (f64, f64)>) -> PriceResult<Self::Output>;
}

/// A **strategy** turning raw property attributes into prices.
///
/// All learned parameters live in [Pipeline::State], which is returned by [fit](Pipeline::fit) and
/// handed back into every other call. The pipeline itself only carries configuration, so one
/// state can be shared between threads and many pipelines can be fit side by side.
pub trait Pipeline {
    /// Everything learned during fit.
    type State;

    /// Learns all encoders and the regressor on `features` with one target per row.
    fn fit(&self, features: &Frame, targets: &[f64]) -> PriceResult<Self::State>;

    /// Encodes `features` into the matrix the regressor consumes.
    /// The order of columns in `features` does not matter.
    fn transform(&self, state: &Self::State, features: &Frame) -> PriceResult<FeatureMatrix>;

    /// Gives one price per row of `features`.
    fn predict(&self, state: &Self::State, features: &Frame) -> PriceResult<Vec<f64>>;

    /// Predicts `features` and lets `evaluator` compare the result with the known `targets`.
    fn evaluate<E: Evaluator>(
        &self,
        state: &Self::State,
        features: &Frame,
        targets: &[f64],
        evaluator: &E,
    ) -> PriceResult<E::Output> {
        if features.n_rows() != targets.len() {
            return Err(PriceError::Shape(format!(
                "{} feature rows but {} targets",
                features.n_rows(),
                targets.len()
            )));
        }
        let predictions = self.predict(state, features)?;
        evaluator.evaluate(targets.iter().copied().zip(predictions))
    }
}
