//! Ordinal encoding of the building state.
//!
//! The order of the states is fixed and not learned from data, so fitting only checks that the
//! training data stays within the known states.
use common::{columns, Column, Fit, Frame, PriceError, PriceResult, Transform};
use serde::{Deserialize, Serialize};

/// The state a missing value is mapped to.
pub const UNKNOWN_STATE: &str = "unknown";

/// All known building states from worst to best, the position is the encoded rank.
pub const STATE_ORDER: [&str; 10] = [
    UNKNOWN_STATE,
    "To demolish",
    "Under construction",
    "To restore",
    "To renovate",
    "To be renovated",
    "Normal",
    "Fully renovated",
    "Excellent",
    "New",
];

/// Replaces the building state column by its rank in [STATE_ORDER].
#[derive(Debug, Clone)]
pub struct StateEncoder {
    column: String,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self::new(columns::STATE_OF_BUILDING)
    }
}

impl StateEncoder {
    /// Creates a new StateEncoder which encodes `column`.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

/// The result of fitting a [StateEncoder].
/// It keeps its own copy of the order, so a persisted encoder stays readable on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedStateEncoder {
    column: String,
    order: Vec<String>,
}

impl Fit for StateEncoder {
    type Fitted = FittedStateEncoder;

    fn fit(&self, frame: &Frame) -> PriceResult<Self::Fitted> {
        let fitted = FittedStateEncoder {
            column: self.column.clone(),
            order: STATE_ORDER.iter().map(|state| state.to_string()).collect(),
        };
        for value in frame.categorical(&self.column)? {
            fitted.rank(value.as_deref())?;
        }
        Ok(fitted)
    }
}

impl FittedStateEncoder {
    /// Gives the name of the column this encoder reads.
    pub fn input_column(&self) -> &str {
        &self.column
    }

    /// Gives the name of the column this encoder writes.
    pub fn output_column(&self) -> String {
        columns::ordinal_encoded(&self.column)
    }

    /// Gives the rank of a state. A missing state counts as [UNKNOWN_STATE].
    /// # Returns
    /// - A [PriceError::DomainDrift] if the state is not known.
    pub fn rank(&self, state: Option<&str>) -> PriceResult<usize> {
        let state = state.unwrap_or(UNKNOWN_STATE);
        self.order
            .iter()
            .position(|known| known == state)
            .ok_or_else(|| PriceError::DomainDrift {
                column: self.column.clone(),
                value: state.to_string(),
            })
    }
}

impl Transform for FittedStateEncoder {
    fn transform(&self, frame: &mut Frame) -> PriceResult<()> {
        let ranks = frame
            .categorical(&self.column)?
            .iter()
            .map(|value| self.rank(value.as_deref()).map(|rank| Some(rank as f64)))
            .collect::<PriceResult<Vec<_>>>()?;

        let output = self.output_column();
        frame.drop_column(&output);
        frame.push_column(Column::numeric(output, ranks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(values: &[Option<&str>]) -> Frame {
        Frame::with_columns(vec![Column::categorical(
            columns::STATE_OF_BUILDING,
            values.iter().map(|value| value.map(str::to_string)).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn ranks_follow_fixed_order() {
        let mut frame = states(&[Some("New"), None, Some("To demolish"), Some("Normal")]);
        let fitted = StateEncoder::default().fit(&frame).unwrap();
        fitted.transform(&mut frame).unwrap();

        assert_eq!(
            frame.numeric("state_of_building_oe").unwrap(),
            &[Some(9.0), Some(0.0), Some(1.0), Some(6.0)]
        );
        // the source column is kept, dropping it is up to the caller
        assert!(frame.column(columns::STATE_OF_BUILDING).is_some());
    }

    #[test]
    fn every_known_state_has_its_position_as_rank() {
        let fitted = StateEncoder::default().fit(&states(&[])).unwrap();
        for (expected, state) in STATE_ORDER.iter().enumerate() {
            assert_eq!(fitted.rank(Some(*state)).unwrap(), expected);
        }
    }

    #[test]
    fn unknown_state_is_domain_drift() {
        let result = StateEncoder::default().fit(&states(&[Some("Haunted")]));
        match result {
            Err(PriceError::DomainDrift { column, value }) => {
                assert_eq!(column, columns::STATE_OF_BUILDING);
                assert_eq!(value, "Haunted");
            }
            other => panic!("expected domain drift, got {:?}", other),
        }

        let fitted = StateEncoder::default().fit(&states(&[Some("New")])).unwrap();
        let mut frame = states(&[Some("Haunted")]);
        assert!(matches!(
            fitted.transform(&mut frame),
            Err(PriceError::DomainDrift { .. })
        ));
    }

    #[test]
    fn transform_twice_replaces_output() {
        let mut frame = states(&[Some("Excellent")]);
        let fitted = StateEncoder::default().fit(&frame).unwrap();
        fitted.transform(&mut frame).unwrap();
        let once = frame.clone();
        fitted.transform(&mut frame).unwrap();

        assert_eq!(frame, once);
    }

    #[test]
    fn missing_column_is_a_shape_error() {
        let frame = Frame::with_columns(vec![Column::numeric("number_facades", vec![])]).unwrap();
        assert!(StateEncoder::default()
            .fit(&frame)
            .unwrap_err()
            .is_shape_error());
    }
}
