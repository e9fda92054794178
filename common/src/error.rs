use std::{error::Error, fmt::Display};

/// This type gets used as the catch all error of the workspace.
/// Library errors convert into [PriceError::OtherPriceError], the pipeline specific failure modes
/// get their own variants so callers can tell them apart.
#[derive(Debug)]
pub enum PriceError {
    /// Allows a generic Error message.
    StringPriceError(String),
    /// Anticipated errors, may be rethrown with an additional error message
    RethrowPriceError(String, Box<dyn Error + Send + Sync>),
    /// All other library Errors get converted to this error.
    OtherPriceError(Box<dyn Error + Send + Sync>),
    /// The input table does not have the shape the fitted pipeline expects, e.g. a required column
    /// is missing or an unexpected column is present.
    Shape(String),
    /// An ordinal category outside of the fixed vocabulary was encountered.
    DomainDrift {
        /// The column in which the value was found.
        column: String,
        /// The offending value.
        value: String,
    },
    /// The fitted model could not produce a prediction, e.g. because the artifact is corrupted.
    Inference(String),
}

/// This type is our goto Result, as it allows us to convert between many different errors.
pub type PriceResult<O> = Result<O, PriceError>;

impl Display for PriceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceError::StringPriceError(str) => str.fmt(f),
            PriceError::RethrowPriceError(str, err) => {
                str.fmt(f)?;
                " with: ".fmt(f)?;
                err.fmt(f)?;
                Ok(())
            }
            PriceError::OtherPriceError(err) => err.fmt(f),
            PriceError::Shape(str) => write!(f, "shape mismatch: {}", str),
            PriceError::DomainDrift { column, value } => write!(
                f,
                "value {:?} in column {:?} is outside of the known categories",
                value, column
            ),
            PriceError::Inference(str) => write!(f, "inference failed: {}", str),
        }
    }
}
impl Error for PriceError {}

impl PriceError {
    /// Allows to annotate a PriceError to better detect the origin of errors.
    /// # Usage
    /// ```
    /// # use common::{PriceError, PriceResult};
    /// # fn fallible_function() -> PriceResult<()> {
    /// # Err(PriceError::StringPriceError("".into()))
    /// # }
    /// # fn container_function() -> PriceResult<()> {
    /// fallible_function().map_err(PriceError::rethrow_with("function failed"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn rethrow_with(str: &'static str) -> impl Fn(PriceError) -> PriceError {
        move |err| PriceError::RethrowPriceError(str.to_string(), Box::new(err))
    }

    /// Like [rethrow_with](PriceError::rethrow_with), but [PriceError::Shape] and
    /// [PriceError::DomainDrift] pass through unchanged, so callers can still match on them.
    pub fn rethrow_unless_input_error(str: &'static str) -> impl Fn(PriceError) -> PriceError {
        move |err| match err {
            PriceError::Shape(_) | PriceError::DomainDrift { .. } => err,
            other => PriceError::rethrow_with(str)(other),
        }
    }

    /// Is this error caused by the caller handing in a table of the wrong shape?
    pub fn is_shape_error(&self) -> bool {
        match self {
            PriceError::Shape(_) => true,
            PriceError::RethrowPriceError(_, inner) => inner
                .downcast_ref::<PriceError>()
                .map_or(false, PriceError::is_shape_error),
            _ => false,
        }
    }
}

macro_rules! implement_from {
    ($type:ty) => {
        impl From<$type> for PriceError {
            fn from(other: $type) -> Self {
                PriceError::OtherPriceError(Box::from(other))
            }
        }
    };
}
implement_from!(std::io::Error);
implement_from!(serde_json::Error);
implement_from!(csv::Error);
implement_from!(std::num::ParseFloatError);

impl<'a> From<&'a str> for PriceError {
    fn from(other: &'a str) -> Self {
        PriceError::StringPriceError(other.to_string())
    }
}
impl From<String> for PriceError {
    fn from(other: String) -> Self {
        PriceError::StringPriceError(other)
    }
}
