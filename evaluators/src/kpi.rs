//! This module contains an evaluator and output type that captures the error metrics we report for
//! price predictions.
use std::fmt::Display;

use common::PriceResult;
use predictions::Evaluator;
use serde::{Deserialize, Serialize};

use super::mean;

/// A struct which contains all our key performance indicators.
/// All absolute metrics are in euro.
#[derive(Copy, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[allow(missing_docs)]
pub struct KpiOutput {
    pub mean_squared_error: f64,
    pub root_mean_squared_error: f64,
    pub mean_absolute_error: f64,

    pub r_squared: f64,

    /// The number of evaluated pairs.
    pub count: usize,
}

fn significant(num: f64) -> f64 {
    if num == 0.0 || !num.is_finite() {
        return num;
    }
    let log10 = num.abs().log10().floor();
    let fac = 10f64.powf(-log10) * 100.0;
    (num * fac).round() / fac
}

impl Display for KpiOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "========== Key Performance Indicators ==========")?;
        writeln!(f, "Evaluated pairs: {}", self.count)?;
        writeln!(f)?;

        // absolute metrics
        writeln!(
            f,
            "Mean Squared error: {}",
            significant(self.mean_squared_error)
        )?;
        writeln!(
            f,
            "Root mean Squared error: {}",
            significant(self.root_mean_squared_error)
        )?;
        writeln!(
            f,
            "Mean absolute error: {}",
            significant(self.mean_absolute_error)
        )?;
        writeln!(f)?;

        // r squared
        writeln!(f, "R squared: {}", significant(self.r_squared))?;
        writeln!(f, "================================================")?;

        Ok(())
    }
}

/// An Evaluator for all our Key Performance Indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KpiEvaluator {}

impl KpiEvaluator {
    /// Creates a new KpiEvaluator
    pub fn new() -> Self {
        Self {}
    }
}

/// Gives the share of the variance of `real` that the predictions explain.
/// If all real prices are equal the variance is 0, then a perfect prediction scores 1 and any
/// other prediction scores 0.
fn r_squared(residual_sum_of_squares: f64, real: impl Iterator<Item = f64> + Clone) -> f64 {
    let real_mean = mean(real.clone());
    let total_sum_of_squares: f64 = real.map(|v| (v - real_mean) * (v - real_mean)).sum();

    if total_sum_of_squares == 0.0 {
        if residual_sum_of_squares == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - residual_sum_of_squares / total_sum_of_squares
    }
}

impl Evaluator for KpiEvaluator {
    type Output = KpiOutput;

    fn evaluate(&self, pairs: impl IntoIterator<Item = (f64, f64)>) -> PriceResult<Self::Output> {
        let pairs: Vec<_> = pairs.into_iter().collect();

        if pairs.is_empty() {
            return Err("No prices were provided".into());
        }
        pairs
            .iter()
            .enumerate()
            .try_for_each(|(idx, (real, predicted))| -> PriceResult<()> {
                if !real.is_finite() {
                    Err(format!("Real price {} has Nan or inf value", idx).into())
                } else if !predicted.is_finite() {
                    Err(format!("Predicted price {} has Nan or inf value", idx).into())
                } else {
                    Ok(())
                }
            })?;

        let absolute_deviations = pairs.iter().map(|(real, predicted)| real - predicted);

        let residual_sum_of_squares: f64 = absolute_deviations.clone().map(|d| d * d).sum();
        let mean_squared_error = residual_sum_of_squares / pairs.len() as f64;

        let output = KpiOutput {
            mean_squared_error,
            root_mean_squared_error: mean_squared_error.sqrt(),
            mean_absolute_error: mean(absolute_deviations.map(|d| d.abs())),
            r_squared: r_squared(
                residual_sum_of_squares,
                pairs.iter().map(|(real, _)| *real),
            ),
            count: pairs.len(),
        };
        log::debug!("evaluated {} pairs: {:?}", output.count, output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn perfect_predictions() {
        let prices = vec![250_000.0, 310_000.0, 189_000.0, 1_200_000.0];
        let output = KpiEvaluator::new()
            .evaluate(prices.iter().map(|&price| (price, price)))
            .unwrap();

        assert_eq!(output.mean_absolute_error, 0.0);
        assert_eq!(output.root_mean_squared_error, 0.0);
        assert_eq!(output.r_squared, 1.0);
        assert_eq!(output.count, 4);
    }

    #[test]
    fn known_deviations() {
        let output = KpiEvaluator::new()
            .evaluate(vec![(100.0, 110.0), (200.0, 170.0), (300.0, 300.0)])
            .unwrap();

        assert_approx_eq!(output.mean_absolute_error, 40.0 / 3.0);
        assert_approx_eq!(output.mean_squared_error, 1000.0 / 3.0);
        assert_approx_eq!(output.root_mean_squared_error, (1000.0f64 / 3.0).sqrt());
        // total sum of squares is 20000
        assert_approx_eq!(output.r_squared, 1.0 - 1000.0 / 20000.0);
    }

    #[test]
    fn constant_real_prices() {
        let exact = KpiEvaluator::new()
            .evaluate(vec![(5.0, 5.0), (5.0, 5.0)])
            .unwrap();
        assert_eq!(exact.r_squared, 1.0);

        let off = KpiEvaluator::new()
            .evaluate(vec![(5.0, 4.0), (5.0, 5.0)])
            .unwrap();
        assert_eq!(off.r_squared, 0.0);
    }

    #[test]
    fn empty_and_non_finite_input_is_an_error() {
        assert!(KpiEvaluator::new()
            .evaluate(Vec::<(f64, f64)>::new())
            .is_err());
        assert!(KpiEvaluator::new()
            .evaluate(vec![(1.0, f64::NAN)])
            .is_err());
        assert!(KpiEvaluator::new()
            .evaluate(vec![(f64::INFINITY, 1.0)])
            .is_err());
    }

    #[test]
    fn display_rounds_to_three_significant_digits() {
        assert_approx_eq!(significant(123_456.0), 123_000.0, 1e-6);
        assert_eq!(significant(0.0), 0.0);

        let output = KpiEvaluator::new()
            .evaluate(vec![(100.0, 110.0), (200.0, 170.0)])
            .unwrap();
        assert!(output.to_string().contains("Mean absolute error: 20"));
    }

    proptest! {
        #[test]
        fn rmse_bounds_mae(pairs in prop::collection::vec((1.0e4..2.0e6f64, 1.0e4..2.0e6f64), 1..64)) {
            let output = KpiEvaluator::new().evaluate(pairs).unwrap();

            prop_assert!(output.mean_absolute_error >= 0.0);
            prop_assert!(output.root_mean_squared_error + 1e-6 >= output.mean_absolute_error);
            prop_assert!(output.r_squared <= 1.0);
        }
    }
}
