#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]

//! This crate contains all our evaluators.

pub mod kpi;
pub use kpi::{KpiEvaluator, KpiOutput};

fn mean(iter: impl Iterator<Item = f64> + Clone) -> f64 {
    iter.clone().sum::<f64>() / iter.count() as f64
}
