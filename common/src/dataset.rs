//! This module contains functions to load training data.
use std::{io, path::Path};

use crate::{columns, Column, Frame, PriceError, PriceResult};

/// Input features together with the known sale prices, one price per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// The raw, not yet encoded input columns.
    pub features: Frame,
    /// The sale price of every row, in euro.
    pub targets: Vec<f64>,
}

impl Dataset {
    /// Creates a new Dataset.
    /// # Returns
    /// - An `Err` if there is not exactly one target per row.
    pub fn new(features: Frame, targets: Vec<f64>) -> PriceResult<Self> {
        if features.n_rows() != targets.len() {
            return Err(PriceError::Shape(format!(
                "{} feature rows but {} targets",
                features.n_rows(),
                targets.len()
            )));
        }
        Ok(Self { features, targets })
    }

    /// Gives the number of rows.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Creates a new Dataset containing only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select_rows(indices),
            targets: indices.iter().map(|&idx| self.targets[idx]).collect(),
        }
    }

    /// Gives the smallest and largest target.
    pub fn target_range(&self) -> Option<(f64, f64)> {
        self.targets.iter().copied().fold(None, |range, target| {
            Some(match range {
                None => (target, target),
                Some((min, max)) => (min.min(target), max.max(target)),
            })
        })
    }
}

/// Read a training csv from `path`.
/// See [read_csv] for the expected format.
pub fn read_csv_from_path<P: AsRef<Path>>(path: P, target_column: &str) -> PriceResult<Dataset> {
    log::info!("reading training data from {}", path.as_ref().display());
    let file_handle = std::fs::File::open(path)?;
    read_csv(file_handle, target_column)
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("na")
}

/// Read a training csv with a header row.
/// The four categorical columns (see [columns::CATEGORICAL_COLUMNS]) are read as strings, every
/// other column except `target_column` is read as a number. Empty cells, `nan` and `NA` count as
/// missing.
/// # Returns
/// - An `Err` if the target column is absent, a target is missing or a number can't be parsed.
pub fn read_csv<R: io::Read>(reader: R, target_column: &str) -> PriceResult<Dataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let target_idx = headers
        .iter()
        .position(|header| header == target_column)
        .ok_or_else(|| {
            PriceError::Shape(format!("target column `{}` is missing", target_column))
        })?;

    let mut numeric: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    let mut categorical: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut targets = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (idx, (header, cell)) in headers.iter().zip(record.iter()).enumerate() {
            if idx == target_idx {
                if is_missing(cell) {
                    return Err(format!("row {} has no `{}`", row + 1, target_column).into());
                }
                targets.push(parse_number(cell, row, header)?);
            } else if columns::is_categorical(header) {
                categorical[idx].push(if is_missing(cell) {
                    None
                } else {
                    Some(cell.trim().to_string())
                });
            } else {
                numeric[idx].push(if is_missing(cell) {
                    None
                } else {
                    Some(parse_number(cell, row, header)?)
                });
            }
        }
    }

    let mut features = Frame::new();
    for (idx, header) in headers.into_iter().enumerate() {
        if idx == target_idx {
            continue;
        }
        let column = if columns::is_categorical(&header) {
            Column::categorical(header, std::mem::take(&mut categorical[idx]))
        } else {
            Column::numeric(header, std::mem::take(&mut numeric[idx]))
        };
        features.push_column(column)?;
    }

    log::info!(
        "read {} rows with {} feature columns",
        targets.len(),
        features.n_columns()
    );
    Dataset::new(features, targets)
}

fn parse_number(cell: &str, row: usize, header: &str) -> PriceResult<f64> {
    cell.trim().parse::<f64>().map_err(|err| {
        PriceError::RethrowPriceError(
            format!("could not parse `{}` in row {} as a number", header, row + 1),
            Box::new(err),
        )
    })
}
