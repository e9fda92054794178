//! Label encoding of the nominal columns.
//!
//! Every distinct value gets an integer code in the order it is first seen during fit. Values which
//! were not seen during fit are encoded as [UNSEEN_CODE] instead of failing.
use std::collections::BTreeMap;

use common::{columns, Column, Fit, Frame, PriceResult, Transform};
use serde::{Deserialize, Serialize};

/// The code of a value which was not present at fit time.
pub const UNSEEN_CODE: i64 = -1;

/// The category a missing value is counted as.
pub const MISSING_CATEGORY: &str = "missing";

/// The learned codes of one column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelMapping {
    codes: BTreeMap<String, i64>,
}

impl LabelMapping {
    /// Learns codes 0, 1, 2, ... in order of first occurrence.
    pub fn learn<'v>(values: impl IntoIterator<Item = Option<&'v str>>) -> Self {
        let mut codes = BTreeMap::new();
        for value in values {
            let next_code = codes.len() as i64;
            codes
                .entry(value.unwrap_or(MISSING_CATEGORY).to_string())
                .or_insert(next_code);
        }
        Self { codes }
    }

    /// Gives the code of `value`, [UNSEEN_CODE] if it was not learned.
    pub fn code(&self, value: Option<&str>) -> i64 {
        match self.codes.get(value.unwrap_or(MISSING_CATEGORY)) {
            Some(&code) => code,
            None => UNSEEN_CODE,
        }
    }

    /// Gives the number of learned categories.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if nothing was learned.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Gives the learned categories ordered by their code.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<_> = self.codes.iter().collect();
        categories.sort_by_key(|(_, &code)| code);
        categories
            .into_iter()
            .map(|(category, _)| category.as_str())
            .collect()
    }
}

/// Adds an integer code column for each of the configured nominal columns.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    columns: Vec<String>,
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::new(columns::NOMINAL_COLUMNS.iter().copied())
    }
}

impl LabelEncoder {
    /// Creates a new LabelEncoder. The code columns are appended in the given order.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// The mapping of one column, as held by a [FittedLabelEncoder].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    column: String,
    mapping: LabelMapping,
}

/// The result of fitting a [LabelEncoder].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLabelEncoder {
    mappings: Vec<ColumnMapping>,
}

impl Fit for LabelEncoder {
    type Fitted = FittedLabelEncoder;

    fn fit(&self, frame: &Frame) -> PriceResult<Self::Fitted> {
        let mappings = self
            .columns
            .iter()
            .map(|column| -> PriceResult<ColumnMapping> {
                let mapping =
                    LabelMapping::learn(frame.categorical(column)?.iter().map(Option::as_deref));
                log::debug!("learned {} categories for `{}`", mapping.len(), column);
                Ok(ColumnMapping {
                    column: column.clone(),
                    mapping,
                })
            })
            .collect::<PriceResult<_>>()?;
        Ok(FittedLabelEncoder { mappings })
    }
}

impl FittedLabelEncoder {
    /// Gives the mapping learned for `column`, if it is encoded by this encoder.
    pub fn mapping(&self, column: &str) -> Option<&LabelMapping> {
        self.mappings
            .iter()
            .find(|mapping| mapping.column == column)
            .map(|mapping| &mapping.mapping)
    }

    /// Gives the names of the columns this encoder reads, in order.
    pub fn input_columns(&self) -> Vec<&str> {
        self.mappings
            .iter()
            .map(|mapping| mapping.column.as_str())
            .collect()
    }

    /// Gives the names of the columns this encoder writes, in order.
    pub fn output_columns(&self) -> Vec<String> {
        self.mappings
            .iter()
            .map(|mapping| columns::label_encoded(&mapping.column))
            .collect()
    }
}

impl Transform for FittedLabelEncoder {
    fn transform(&self, frame: &mut Frame) -> PriceResult<()> {
        for ColumnMapping { column, mapping } in &self.mappings {
            let codes: Vec<i64> = frame
                .categorical(column)?
                .iter()
                .map(|value| mapping.code(value.as_deref()))
                .collect();

            let unseen = codes.iter().filter(|&&code| code == UNSEEN_CODE).count();
            if unseen > 0 {
                log::warn!(
                    "{} value(s) of `{}` were not seen during fit, encoding them as {}",
                    unseen,
                    column,
                    UNSEEN_CODE
                );
            }

            let output = columns::label_encoded(column);
            frame.drop_column(&output);
            frame.push_column(Column::numeric(
                output,
                codes.into_iter().map(|code| Some(code as f64)).collect(),
            ))?;
        }
        Ok(())
    }
}
