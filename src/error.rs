//! Custom error types for the crate.
//!
//! This module defines the primary error type, `ResultsError`, used across the
//! parameter registry, placeholder resolution and file naming. Using the
//! `thiserror` crate, it provides a centralized and consistent way to handle the
//! different failure classes:
//!
//! - **`UnresolvedPlaceholder`** / **`InvalidTemplate`** / **`IncompatibleFormat`**:
//!   template resolution failures. An unknown display name, malformed token
//!   syntax, and a format spec that does not apply to the value's type are kept
//!   distinct so callers can tell a typo in a template apart from a typo in a
//!   parameter declaration.
//! - **`DuplicateParameter`** / **`UnknownParameter`** / **`ParameterNotSet`** /
//!   **`TypeMismatch`** / **`OutOfRange`** / **`InvalidChoice`**: registry and
//!   parameter-value violations. These are programming or configuration errors
//!   and are never silently coerced away.
//! - **`ColumnCountMismatch`**: a data row that does not line up with the
//!   declared columns of a results file.
//! - **`ConfigLoad`** / **`Configuration`**: file/env parsing errors from
//!   `figment`, and semantic errors that pass parsing but fail validation.
//! - **`Io`**: wraps standard `std::io::Error` for directory and file handling.
//!
//! By using `#[from]`, `ResultsError` can be seamlessly created from underlying
//! error types, simplifying error handling throughout the crate with the `?`
//! operator.

use thiserror::Error;

use crate::parameter::{ParameterKind, ParameterValue};

/// Convenience alias for results using the crate error type.
pub type AppResult<T> = std::result::Result<T, ResultsError>;

/// The error type for parameter, naming and results-file operations.
#[derive(Error, Debug)]
pub enum ResultsError {
    /// A template referenced a display name absent from the parameter store.
    #[error("Unresolved placeholder '{0}' in template")]
    UnresolvedPlaceholder(String),

    /// The template itself is malformed (unterminated token, bad spec syntax).
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A format spec that cannot be applied to the value's type.
    #[error("Format spec incompatible with parameter value: {0}")]
    IncompatibleFormat(String),

    /// A parameter with the same display name or id is already registered.
    #[error("Parameter '{0}' is already registered")]
    DuplicateParameter(String),

    /// No parameter with the given id exists in the registry.
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    /// The parameter was declared without a default and has not been set.
    #[error("Parameter '{0}' has no value")]
    ParameterNotSet(String),

    /// A value of the wrong kind was assigned to a parameter.
    #[error("Parameter '{parameter}' expects a {expected} value, got {actual}")]
    TypeMismatch {
        /// Display name of the rejected parameter.
        parameter: String,
        /// The parameter's declared kind.
        expected: ParameterKind,
        /// The kind of the offered value.
        actual: ParameterKind,
    },

    /// A numeric value outside the parameter's inclusive range.
    #[error("Value {value} for parameter '{parameter}' is outside [{minimum}, {maximum}]")]
    OutOfRange {
        /// Display name of the rejected parameter.
        parameter: String,
        /// The offered value.
        value: f64,
        /// Lower inclusive bound.
        minimum: f64,
        /// Upper inclusive bound.
        maximum: f64,
    },

    /// A value not present in the parameter's declared choices.
    #[error("Value {value} is not a valid choice for parameter '{parameter}'")]
    InvalidChoice {
        /// Display name of the rejected parameter.
        parameter: String,
        /// The offered value.
        value: ParameterValue,
    },

    /// A data row whose length differs from the declared column count.
    #[error("Row has {actual} values but {expected} columns are declared")]
    ColumnCountMismatch {
        /// Number of declared columns.
        expected: usize,
        /// Number of values in the rejected row.
        actual: usize,
    },

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    ConfigLoad(#[from] figment::Error),

    /// Configuration parsed but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// I/O failure while preparing directories or files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<strfmt::FmtError> for ResultsError {
    fn from(err: strfmt::FmtError) -> Self {
        match err {
            strfmt::FmtError::KeyError(msg) => ResultsError::UnresolvedPlaceholder(msg),
            strfmt::FmtError::TypeError(msg) => ResultsError::IncompatibleFormat(msg),
            strfmt::FmtError::Invalid(msg) => ResultsError::InvalidTemplate(msg),
        }
    }
}
