#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]

//! This crate contains the preprocessing stages which turn raw property attributes into numbers.
//! Every stage implements [common::Fit] and its fitted counterpart [common::Transform].
mod imputer;
pub use imputer::{ColumnMean, FittedNumericImputer, NumericImputer};

pub mod ordinal;
pub use ordinal::{FittedStateEncoder, StateEncoder};

pub mod label;
pub use label::{FittedLabelEncoder, LabelEncoder, LabelMapping};
