//! Typed experiment parameters.
//!
//! A [`Parameter`] describes one declared input of a measurement procedure:
//! an internal id used by code, a human-readable display name used in
//! templates and file headers, a semantic kind, and an optional current
//! value with optional units and constraints.
//!
//! Values are held as [`ParameterValue`], a small enum covering the kinds
//! experiment inputs come in. How a value renders into text is decided per
//! kind: booleans always read `True`/`False`, numerics use their native
//! representation, and format specs in templates are forwarded to the
//! numeric formatter only where they make sense (see the `strfmt::DisplayStr`
//! impl below).
//!
//! # Example
//!
//! ```rust,ignore
//! use daq_results::parameter::Parameter;
//!
//! let mut power = Parameter::float("pump_power", "Pump Power")
//!     .with_units("mW")
//!     .with_range(0.0, 500.0)
//!     .with_default(10.0);
//!
//! power.set(125.5)?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use strfmt::DisplayStr;

use crate::error::{AppResult, ResultsError};

// =============================================================================
// ParameterValue
// =============================================================================

/// Strongly-typed value of an experiment parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Semantic kind of a parameter, fixed at declaration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    Boolean,
    Integer,
    Float,
    Text,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Boolean => write!(f, "boolean"),
            ParameterKind::Integer => write!(f, "integer"),
            ParameterKind::Float => write!(f, "float"),
            ParameterKind::Text => write!(f, "text"),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Canonical rendering for booleans everywhere a value becomes
            // text: capitalized words, not `true`/`false`.
            ParameterValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            ParameterValue::Int(i) => write!(f, "{}", i),
            ParameterValue::Float(fl) => write!(f, "{}", fl),
            ParameterValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl ParameterValue {
    /// The kind this value belongs to
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Bool(_) => ParameterKind::Boolean,
            ParameterValue::Int(_) => ParameterKind::Integer,
            ParameterValue::Float(_) => ParameterKind::Float,
            ParameterValue::String(_) => ParameterKind::Text,
        }
    }

    /// Extract value as a string, rendering from various types
    pub fn as_string(&self) -> Option<String> {
        match self {
            ParameterValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Extract value as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(f) => Some(*f),
            ParameterValue::Int(i) => Some(*i as f64),
            ParameterValue::String(s) => s.parse().ok(),
            ParameterValue::Bool(_) => None,
        }
    }

    /// Extract value as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            ParameterValue::Float(f) => Some(*f as i64),
            ParameterValue::String(s) => s.parse().ok(),
            ParameterValue::Bool(_) => None,
        }
    }

    /// Extract value as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            ParameterValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        ParameterValue::Int(i64::from(value))
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Int(i64::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

/// Per-kind dispatch into the template formatter.
///
/// Format specs travel verbatim into the numeric paths for `Int` and
/// `Float`, so `{Pump Power:.2f}` behaves like the native formatter says it
/// should. Booleans and strings take the string path; a numeric-only spec
/// applied to them is rejected by the formatter rather than coerced.
impl DisplayStr for ParameterValue {
    fn display_str(&self, f: &mut strfmt::Formatter) -> strfmt::Result<()> {
        match self {
            ParameterValue::Bool(b) => f.str(if *b { "True" } else { "False" }),
            ParameterValue::Int(i) => f.i64(*i),
            ParameterValue::Float(fl) => f.f64(*fl),
            ParameterValue::String(s) => f.str(s),
        }
    }
}

// =============================================================================
// Parameter
// =============================================================================

/// One declared input of a measurement procedure.
///
/// The `id` is the identifier code refers to (e.g. `"exposure_ms"`); the
/// display name is the label the parameter is registered under and the key
/// templates use (e.g. `"Exposure Time"`). The two are deliberately kept
/// distinct so renaming a label never breaks code.
///
/// A parameter starts unset unless given a default. `set` validates the
/// kind first (an integer widens to float for float parameters, nothing
/// else is coerced), then the optional range and choices constraints.
#[derive(Clone, Debug)]
pub struct Parameter {
    id: String,
    display_name: String,
    kind: ParameterKind,
    value: Option<ParameterValue>,
    units: Option<String>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    choices: Option<Vec<ParameterValue>>,
}

impl Parameter {
    fn new(id: impl Into<String>, display_name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            value: None,
            units: None,
            minimum: None,
            maximum: None,
            choices: None,
        }
    }

    /// Create a text parameter.
    pub fn text(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, ParameterKind::Text)
    }

    /// Create a boolean parameter.
    pub fn boolean(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, ParameterKind::Boolean)
    }

    /// Create an integer parameter.
    pub fn integer(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, ParameterKind::Integer)
    }

    /// Create a float parameter.
    pub fn float(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, ParameterKind::Float)
    }

    /// Set the initial value.
    ///
    /// The value is stored as given (integers widen for float parameters)
    /// and checked against kind and constraints when the parameter is
    /// registered. Returns `self` for method chaining.
    pub fn with_default(mut self, value: impl Into<ParameterValue>) -> Self {
        self.value = Some(self.widened(value.into()));
        self
    }

    /// Set the unit of measurement (e.g. "ms", "mW", "nm").
    ///
    /// Returns `self` for method chaining.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Set numeric range constraints (inclusive bounds).
    ///
    /// Only meaningful for integer and float parameters.
    /// Returns `self` for method chaining.
    pub fn with_range(mut self, minimum: impl Into<f64>, maximum: impl Into<f64>) -> Self {
        self.minimum = Some(minimum.into());
        self.maximum = Some(maximum.into());
        self
    }

    /// Set discrete choice constraints.
    ///
    /// Values must match one of the provided choices exactly.
    /// Returns `self` for method chaining.
    pub fn with_choices(mut self, choices: Vec<ParameterValue>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Internal identifier, the name code refers to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable label, the key templates resolve against.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Declared kind.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Unit of measurement, if any.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Whether the parameter currently holds a value.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Current value.
    ///
    /// Returns [`ResultsError::ParameterNotSet`] if the parameter was
    /// declared without a default and has not been assigned.
    pub fn value(&self) -> AppResult<&ParameterValue> {
        self.value
            .as_ref()
            .ok_or_else(|| ResultsError::ParameterNotSet(self.display_name.clone()))
    }

    /// Assign a value, validating kind, range and choices.
    pub fn set(&mut self, value: impl Into<ParameterValue>) -> AppResult<()> {
        let value = self.widened(value.into());
        self.check_kind(&value)?;
        self.check_constraints(&value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Integers widen to floats for float parameters; everything else
    /// passes through untouched.
    fn widened(&self, value: ParameterValue) -> ParameterValue {
        match (self.kind, value) {
            (ParameterKind::Float, ParameterValue::Int(i)) => ParameterValue::Float(i as f64),
            (_, value) => value,
        }
    }

    fn check_kind(&self, value: &ParameterValue) -> AppResult<()> {
        if value.kind() == self.kind {
            Ok(())
        } else {
            Err(ResultsError::TypeMismatch {
                parameter: self.display_name.clone(),
                expected: self.kind,
                actual: value.kind(),
            })
        }
    }

    fn check_constraints(&self, value: &ParameterValue) -> AppResult<()> {
        if let (Some(minimum), Some(maximum)) = (self.minimum, self.maximum) {
            // Range only ever constrains numeric kinds.
            if let Some(v) = value.as_f64() {
                if v < minimum || v > maximum {
                    return Err(ResultsError::OutOfRange {
                        parameter: self.display_name.clone(),
                        value: v,
                        minimum,
                        maximum,
                    });
                }
            }
        }

        if let Some(choices) = &self.choices {
            if !choices.iter().any(|c| c == value) {
                return Err(ResultsError::InvalidChoice {
                    parameter: self.display_name.clone(),
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }

    /// Validate the current value (the default, typically) against kind and
    /// constraints. Called when the parameter enters a registry.
    pub(crate) fn check_current(&self) -> AppResult<()> {
        if let Some(value) = &self.value {
            self.check_kind(value)?;
            self.check_constraints(value)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
