//! This module contains the tabular data model the pipeline works on.
//!
//! A [Frame] is a set of named, typed columns of equal length. It is what the front ends hand to
//! the pipeline and what the training data gets read into. A [FeatureMatrix] is the purely numeric,
//! positional matrix the regressor consumes after all encoding steps are done.


use crate::{PriceError, PriceResult};

/// The cells of one column together with their declared type.
/// A `None` cell is a missing value.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    /// Integer or floating point values.
    Numeric(Vec<Option<f64>>),
    /// String valued categories.
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    /// Gives the number of cells in this column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    /// Returns true if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is this column declared as numeric?
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    fn select(&self, indices: &[usize]) -> Self {
        match self {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(indices.iter().map(|&idx| values[idx]).collect())
            }
            ColumnData::Categorical(values) => {
                ColumnData::Categorical(indices.iter().map(|&idx| values[idx].clone()).collect())
            }
        }
    }
}

/// A named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Creates a categorical column.
    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Gives the name of this column.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gives the cells of this column.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }
}

/// A column oriented table with unique column names and a fixed number of rows.
/// The order of columns is kept, but nothing in the pipeline relies on it.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Creates a frame without columns and rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame from the given columns.
    /// # Returns
    /// - An `Err` if the columns differ in length or share a name.
    pub fn with_columns(columns: impl IntoIterator<Item = Column>) -> PriceResult<Self> {
        let mut frame = Self::new();
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    /// Appends a column at the end.
    /// The first column pushed into an empty frame determines the number of rows.
    pub fn push_column(&mut self, column: Column) -> PriceResult<()> {
        if self.column(column.name()).is_some() {
            return Err(PriceError::Shape(format!(
                "column `{}` is present more than once",
                column.name()
            )));
        }
        if self.columns.is_empty() {
            self.n_rows = column.data.len();
        } else if column.data.len() != self.n_rows {
            return Err(PriceError::Shape(format!(
                "column `{}` has {} rows, expected {}",
                column.name(),
                column.data.len(),
                self.n_rows
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Removes the column with the given name and returns it, if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let position = self.columns.iter().position(|column| column.name == name)?;
        Some(self.columns.remove(position))
    }

    /// Gives the number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Gives the number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Iterates over all columns in order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Gives the names of all columns in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Gives the names of all columns declared as numeric, in order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.data.is_numeric())
            .map(|column| column.name.clone())
            .collect()
    }

    /// Gives the column with the given name, if present.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Gives the cells of a numeric column.
    /// # Returns
    /// - An `Err` if there is no such column or it is categorical.
    pub fn numeric(&self, name: &str) -> PriceResult<&[Option<f64>]> {
        match self.column(name).map(Column::data) {
            Some(ColumnData::Numeric(values)) => Ok(values),
            Some(ColumnData::Categorical(_)) => Err(PriceError::Shape(format!(
                "column `{}` is categorical, expected numeric",
                name
            ))),
            None => Err(missing_column(name)),
        }
    }

    /// Gives mutable access to the cells of a numeric column.
    /// The number of cells can not be changed through this.
    pub fn numeric_mut(&mut self, name: &str) -> PriceResult<&mut [Option<f64>]> {
        match self
            .columns
            .iter_mut()
            .find(|column| column.name == name)
            .map(|column| &mut column.data)
        {
            Some(ColumnData::Numeric(values)) => Ok(values.as_mut_slice()),
            Some(ColumnData::Categorical(_)) => Err(PriceError::Shape(format!(
                "column `{}` is categorical, expected numeric",
                name
            ))),
            None => Err(missing_column(name)),
        }
    }

    /// Gives the cells of a categorical column.
    /// # Returns
    /// - An `Err` if there is no such column or it is numeric.
    pub fn categorical(&self, name: &str) -> PriceResult<&[Option<String>]> {
        match self.column(name).map(Column::data) {
            Some(ColumnData::Categorical(values)) => Ok(values),
            Some(ColumnData::Numeric(_)) => Err(PriceError::Shape(format!(
                "column `{}` is numeric, expected categorical",
                name
            ))),
            None => Err(missing_column(name)),
        }
    }

    /// Creates a new frame containing only the rows at `indices`, in that order.
    /// # Panics
    /// If an index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|column| Column {
                    name: column.name.clone(),
                    data: column.data.select(indices),
                })
                .collect(),
            n_rows: indices.len(),
        }
    }
}

fn missing_column(name: &str) -> PriceError {
    PriceError::Shape(format!("required column `{}` is missing", name))
}

/// A dense, row major matrix of features.
/// It carries no column names, the meaning of a column is given by its position only.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    n_columns: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Creates a matrix with `n_columns` columns and no rows.
    pub fn with_columns(n_columns: usize) -> Self {
        Self {
            n_columns,
            values: Vec::new(),
        }
    }

    /// Creates a matrix from a list of rows.
    /// # Returns
    /// - An `Err` if the rows differ in length.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<f64>>) -> PriceResult<Self> {
        let mut rows = rows.into_iter().peekable();
        let n_columns = rows.peek().map_or(0, Vec::len);
        let mut matrix = Self::with_columns(n_columns);
        for row in rows {
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: &[f64]) -> PriceResult<()> {
        if row.len() != self.n_columns {
            return Err(PriceError::Shape(format!(
                "row has {} features, expected {}",
                row.len(),
                self.n_columns
            )));
        }
        self.values.extend_from_slice(row);
        Ok(())
    }

    /// Gives the number of rows.
    pub fn n_rows(&self) -> usize {
        if self.n_columns == 0 {
            0
        } else {
            self.values.len() / self.n_columns
        }
    }

    /// Gives the number of columns.
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Gives the row at `idx`.
    /// # Panics
    /// If `idx` is out of bounds.
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.values[idx * self.n_columns..(idx + 1) * self.n_columns]
    }

    /// Gives the value at the given position.
    /// # Panics
    /// If the position is out of bounds.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.n_columns + column]
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a chunk size of 0
        self.values.chunks_exact(self.n_columns.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_frame() -> Frame {
        Frame::with_columns(vec![
            Column::numeric("living_area (m²)", vec![Some(100.0), None, Some(80.0)]),
            Column::categorical(
                "province",
                vec![Some("Namur".into()), Some("Liège".into()), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn frame_rejects_columns_of_different_length() {
        let mut frame = small_frame();
        let result = frame.push_column(Column::numeric("number_facades", vec![Some(2.0)]));
        assert!(result.unwrap_err().is_shape_error());
    }

    #[test]
    fn frame_rejects_duplicate_names() {
        let mut frame = small_frame();
        let result = frame.push_column(Column::numeric(
            "living_area (m²)",
            vec![Some(1.0), Some(2.0), Some(3.0)],
        ));
        assert!(result.is_err());
    }

    #[test]
    fn typed_access_checks_declared_type() {
        let frame = small_frame();
        assert_eq!(frame.numeric("living_area (m²)").unwrap()[1], None);
        assert!(frame.numeric("province").is_err());
        assert!(frame.categorical("living_area (m²)").is_err());
        assert!(frame.categorical("subtype").unwrap_err().is_shape_error());
        assert_eq!(frame.numeric_column_names(), vec!["living_area (m²)"]);
    }

    #[test]
    fn select_rows_keeps_column_order_and_types() {
        let frame = small_frame();
        let selected = frame.select_rows(&[2, 0]);

        assert_eq!(selected.n_rows(), 2);
        assert_eq!(selected.column_names(), frame.column_names());
        assert_eq!(
            selected.numeric("living_area (m²)").unwrap(),
            &[Some(80.0), Some(100.0)]
        );
        assert_eq!(
            selected.categorical("province").unwrap(),
            &[None, Some("Namur".to_string())]
        );
    }

    #[test]
    fn feature_matrix_rows_are_positional() {
        let matrix =
            FeatureMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();

        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_columns(), 3);
        assert_eq!(matrix.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(matrix.get(0, 2), 3.0);
        assert_eq!(matrix.rows().count(), 2);
        assert!(FeatureMatrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    proptest! {
        #[test]
        fn select_rows_picks_the_requested_cells(
            values in prop::collection::vec(prop::option::of(0.0..1e6f64), 1..64),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 0..64),
        ) {
            let frame = Frame::with_columns(vec![Column::numeric("terrace_area (m²)", values.clone())]).unwrap();
            let indices: Vec<usize> = picks.iter().map(|pick| pick.index(values.len())).collect();
            let selected = frame.select_rows(&indices);

            prop_assert_eq!(selected.n_rows(), indices.len());
            let column = selected.numeric("terrace_area (m²)").unwrap();
            for (cell, &idx) in column.iter().zip(&indices) {
                prop_assert_eq!(*cell, values[idx]);
            }
        }
    }
}
