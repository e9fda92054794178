use common::{Fit, Frame, PriceError, PriceResult, Transform};
use serde::{Deserialize, Serialize};

/// Fills missing values in every numeric column with the mean of that column in the training data.
/// Which columns are numeric is decided by their declared type in the [Frame].
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericImputer;

impl NumericImputer {
    /// Creates a new NumericImputer.
    pub fn new() -> Self {
        Self
    }
}

/// The learned fill value of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMean {
    /// Name of the column.
    pub column: String,
    /// Mean over all present values at fit time.
    /// `None` if the column had no values at all, in that case the mean is undefined and missing
    /// cells get filled with NaN.
    pub mean: Option<f64>,
}

/// The result of fitting a [NumericImputer].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNumericImputer {
    means: Vec<ColumnMean>,
}

fn is_present(value: &Option<f64>) -> Option<f64> {
    value.filter(|value| !value.is_nan())
}

impl Fit for NumericImputer {
    type Fitted = FittedNumericImputer;

    fn fit(&self, frame: &Frame) -> PriceResult<Self::Fitted> {
        let mut means = Vec::new();
        for column in frame.numeric_column_names() {
            let (sum, count) = frame
                .numeric(&column)?
                .iter()
                .filter_map(is_present)
                .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

            let mean = if count == 0 {
                log::warn!(
                    "numeric column `{}` has no values, its imputation mean is undefined",
                    column
                );
                None
            } else {
                Some(sum / count as f64)
            };
            log::debug!("imputation mean for `{}`: {:?}", column, mean);
            means.push(ColumnMean { column, mean });
        }
        Ok(FittedNumericImputer { means })
    }
}

impl FittedNumericImputer {
    /// Gives the learned fill value for every numeric column, in the order seen at fit time.
    pub fn means(&self) -> &[ColumnMean] {
        &self.means
    }

    /// Gives the fill value for `column`, NaN if the mean is undefined.
    /// Returns `None` if the column was not seen at fit time.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.means
            .iter()
            .find(|mean| mean.column == column)
            .map(|mean| mean.mean.unwrap_or(f64::NAN))
    }

    /// Gives all columns that had no values at fit time.
    pub fn degenerate_columns(&self) -> Vec<&str> {
        self.means
            .iter()
            .filter(|mean| mean.mean.is_none())
            .map(|mean| mean.column.as_str())
            .collect()
    }
}

impl Transform for FittedNumericImputer {
    fn transform(&self, frame: &mut Frame) -> PriceResult<()> {
        if let Some(unexpected) = frame
            .numeric_column_names()
            .into_iter()
            .find(|column| self.fill_value(column).is_none())
        {
            return Err(PriceError::Shape(format!(
                "numeric column `{}` was not present at fit time",
                unexpected
            )));
        }

        for ColumnMean { column, mean } in &self.means {
            let fill_value = mean.unwrap_or(f64::NAN);
            for cell in frame.numeric_mut(column)?.iter_mut() {
                if is_present(cell).is_none() {
                    *cell = Some(fill_value);
                }
            }
        }
        Ok(())
    }
}
