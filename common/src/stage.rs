//! This module provides abstraction over the preprocessing stages of the pipeline.
//! Every stage is split into an unfitted configuration implementing [Fit] and the immutable result
//! of fitting implementing [Transform]. The fitted value is owned by the caller and passed
//! explicitly wherever it is needed.

use crate::{Frame, PriceResult};

/// Something that learns its parameters from training data.
pub trait Fit {
    /// What fitting produces.
    type Fitted: Transform;

    /// Learns the parameters of this stage from `frame`.
    /// Implementations may define failure conditions.
    fn fit(&self, frame: &Frame) -> PriceResult<Self::Fitted>;
}

/// A fitted stage which rewrites frames.
pub trait Transform {
    /// Applies this stage to `frame` in place, e.g. by filling cells or appending encoded columns.
    /// Implementations must not change their own state, applying a stage twice to the same input
    /// must give the same result.
    fn transform(&self, frame: &mut Frame) -> PriceResult<()>;
}

impl<T: Transform + ?Sized> Transform for &'_ T {
    fn transform(&self, frame: &mut Frame) -> PriceResult<()> {
        (**self).transform(frame)
    }
}
