use common::{FeatureMatrix, Frame, PriceError, PriceResult};

/// Builds the matrix the regressor consumes, with one column per entry of `feature_cols` in that
/// order. The columns of `frame` are looked up by name, so their order does not matter.
/// # Returns
/// - A shape error if a feature column is missing or `frame` has a column that is not a feature.
pub(crate) fn assemble(frame: &Frame, feature_cols: &[String]) -> PriceResult<FeatureMatrix> {
    if let Some(extra) = frame
        .column_names()
        .into_iter()
        .find(|name| !feature_cols.iter().any(|feature| feature == name))
    {
        return Err(PriceError::Shape(format!(
            "column `{}` is not a feature of the fitted pipeline",
            extra
        )));
    }

    let columns = feature_cols
        .iter()
        .map(|feature| frame.numeric(feature))
        .collect::<PriceResult<Vec<_>>>()?;

    let mut matrix = FeatureMatrix::with_columns(feature_cols.len());
    let mut row = Vec::with_capacity(feature_cols.len());
    for idx in 0..frame.n_rows() {
        row.clear();
        // the imputer fills every gap before assembly, NaN marks an undefined mean
        row.extend(columns.iter().map(|column| column[idx].unwrap_or(f64::NAN)));
        matrix.push_row(&row)?;
    }
    Ok(matrix)
}
