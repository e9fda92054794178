#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]

//! Gradient boosted regression trees with squared error loss.
//!
//! Trees are grown depth first, the best split of a node is searched for in parallel over all
//! sampled features. Given the same data and [GbmParams], training is fully deterministic.
mod params;
pub use params::{GbmParams, GbmParamsBuilder};

mod tree;
pub use tree::{Node, RegressionTree};

mod gbm;
pub use gbm::GradientBoostedRegressor;
