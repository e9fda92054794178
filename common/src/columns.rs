//! The column names used between the front ends, the training data and the pipeline.
//! The names match the header of the training csv, so a [Frame](crate::Frame) read from disk and a
//! [Frame](crate::Frame) built from [PropertyRecord](crate::PropertyRecord)s line up.

use crate::{Frame, PriceError, PriceResult};

/// Property type, e.g. `House`.
pub const TYPE: &str = "type";
/// Property subtype, e.g. `Villa`.
pub const SUBTYPE: &str = "subtype";
/// Belgian province.
pub const PROVINCE: &str = "province";
/// Condition of the building, an ordered category.
pub const STATE_OF_BUILDING: &str = "state_of_building";

/// Living area in square meters.
pub const LIVING_AREA: &str = "living_area (m²)";
/// Number of bedrooms.
pub const NUMBER_OF_BEDROOMS: &str = "number_of_bedrooms";
/// Number of facades, 1 to 4.
pub const NUMBER_FACADES: &str = "number_facades";
/// Does the property have an equipped kitchen? 1 or 0.
// NOTE: the misspelling is what the REST front end sends, keep it
pub const EQUIPED_KITCHEN: &str = "equiped_kitchen (yes:1, no:0)";
/// Is the property sold furnished? 1 or 0.
pub const FURNISHED: &str = "furnished (yes:1, no:0)";
/// Does the property have an open fire? 1 or 0.
pub const OPEN_FIRE: &str = "open_fire (yes:1, no:0)";
/// Does the property have a terrace? 1 or 0.
pub const TERRACE: &str = "terrace (yes:1, no:0)";
/// Terrace area in square meters.
pub const TERRACE_AREA: &str = "terrace_area (m²)";
/// Does the property have a garden? 1 or 0.
pub const GARDEN: &str = "garden (yes:1, no:0)";
/// Does the property have a swimming pool? 1 or 0.
pub const SWIMMING_POOL: &str = "swimming_pool (yes:1, no:0)";

/// Default name of the target column in training data.
pub const PRICE: &str = "price";

/// Suffix of the column produced by the ordinal encoder.
pub const ORDINAL_SUFFIX: &str = "_oe";
/// Suffix of the columns produced by the label encoder.
pub const LABEL_SUFFIX: &str = "_le";

/// The categorical columns which get label encoded, in the order their codes are appended.
pub const NOMINAL_COLUMNS: [&str; 3] = [TYPE, SUBTYPE, PROVINCE];

/// All categorical input columns.
pub const CATEGORICAL_COLUMNS: [&str; 4] = [TYPE, SUBTYPE, PROVINCE, STATE_OF_BUILDING];

/// All numeric input columns, in the order the model was originally trained on.
pub const NUMERIC_COLUMNS: [&str; 10] = [
    NUMBER_OF_BEDROOMS,
    LIVING_AREA,
    EQUIPED_KITCHEN,
    FURNISHED,
    OPEN_FIRE,
    TERRACE,
    TERRACE_AREA,
    GARDEN,
    NUMBER_FACADES,
    SWIMMING_POOL,
];

/// Gives the name of the ordinal encoded version of `column`.
pub fn ordinal_encoded(column: &str) -> String {
    format!("{}{}", column, ORDINAL_SUFFIX)
}

/// Gives the name of the label encoded version of `column`.
pub fn label_encoded(column: &str) -> String {
    format!("{}{}", column, LABEL_SUFFIX)
}

/// Is `column` one of the categorical input columns?
pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&column)
}

/// Checks that `frame` holds exactly the columns a [PropertyRecord](crate::PropertyRecord)
/// converts into, each with its declared type. The order of the columns does not matter.
/// # Returns
/// - A [PriceError::Shape] naming the first missing, mistyped or unexpected column.
pub fn check_record_columns(frame: &Frame) -> PriceResult<()> {
    for column in NUMERIC_COLUMNS.iter() {
        frame.numeric(column)?;
    }
    for column in CATEGORICAL_COLUMNS.iter() {
        frame.categorical(column)?;
    }
    if let Some(extra) = frame
        .column_names()
        .into_iter()
        .find(|name| !NUMERIC_COLUMNS.contains(name) && !is_categorical(name))
    {
        return Err(PriceError::Shape(format!(
            "column `{}` is not a property attribute",
            extra
        )));
    }
    Ok(())
}
