#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]

//! This crate contains our price pipelines.
pub use config::PipelineConfig;
pub use gbm_pipeline::GbmPricePipeline;
pub use state::FittedEncodingState;

mod config;
mod features;
mod gbm_pipeline;
mod state;
pub mod target;

#[cfg(test)]
mod tests;
