#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]

//! This crate contains everything which might be needed across the different parts of the price
//! prediction.

mod error;

pub use error::{PriceError, PriceResult};

pub mod columns;

mod frame;
pub use frame::{Column, ColumnData, FeatureMatrix, Frame};

pub mod property;
pub use property::{PropertyRecord, PropertyRecordBuilder, YesNo};

mod stage;
pub use stage::{Fit, Transform};

pub mod dataset;
pub use dataset::Dataset;

pub mod logging;
pub mod util;
