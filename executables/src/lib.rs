//! This crate contains helper functions that are used exclusively in defining binaries, that is
//! main functions.
use common::{PriceResult, PropertyRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// The only message a caller sees when a prediction fails.
/// Details go to the log, they may name files or columns.
pub const GENERIC_ERROR_MESSAGE: &str = "the price of this property could not be predicted";

/// Read all requests from the file at `path`, or from stdin if there is no path.
/// See [parse_requests] for the accepted formats.
pub fn read_requests(path: Option<&Path>) -> PriceResult<Vec<Value>> {
    let content = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            content
        }
    };
    parse_requests(&content)
}

/// Splits `content` into single requests.
/// Accepts a json document with one object, a json array of objects, or json lines. Arrays are
/// flattened, so every element becomes its own request.
/// # Returns
/// - An `Err` if `content` is not json at all. A request that is json but no valid record is
///   only detected by [parse_record].
pub fn parse_requests(content: &str) -> PriceResult<Vec<Value>> {
    let mut requests = Vec::new();
    for value in serde_json::Deserializer::from_str(content).into_iter::<Value>() {
        match value? {
            Value::Array(values) => requests.extend(values),
            value => requests.push(value),
        }
    }
    Ok(requests)
}

/// Turns one request into a record and checks it against the allowed values.
pub fn parse_record(request: &Value) -> PriceResult<PropertyRecord> {
    let record: PropertyRecord = serde_json::from_value(request.clone())?;
    record.validate()?;
    Ok(record)
}

/// The answer to one request, as printed by `predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_price: Option<f64>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResponse {
    pub fn success(predicted_price: f64) -> Self {
        Self {
            predicted_price: Some(predicted_price),
            status: "success".to_string(),
            error: None,
        }
    }

    pub fn failure() -> Self {
        Self {
            predicted_price: None,
            status: "error".to_string(),
            error: Some(GENERIC_ERROR_MESSAGE.to_string()),
        }
    }
}
