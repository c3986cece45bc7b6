//! Parameter registry: the lookup seam between procedures and templates.
//!
//! Templates resolve against a [`ParameterStore`], keyed strictly by display
//! name. [`ParameterRegistry`] is the concrete store: it preserves
//! declaration order (results headers and column enumeration depend on it)
//! and additionally indexes parameters by id for programmatic assignment.

use std::collections::HashMap;

use crate::error::{AppResult, ResultsError};
use crate::parameter::{Parameter, ParameterValue};

/// Lookup of parameters by display name.
///
/// Implementors promise that display names are unique within one store,
/// and that `get` performs an exact match on the full name, spaces and
/// punctuation included.
pub trait ParameterStore {
    /// The parameter registered under `display_name`, if any.
    fn get(&self, display_name: &str) -> Option<&Parameter>;
}

/// Ordered collection of a procedure's declared parameters.
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    parameters: Vec<Parameter>,
    by_display: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

impl ParameterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    ///
    /// Rejects duplicate display names and duplicate ids, and validates a
    /// declared default against the parameter's kind and constraints.
    pub fn register(&mut self, parameter: Parameter) -> AppResult<()> {
        if self.by_display.contains_key(parameter.display_name()) {
            return Err(ResultsError::DuplicateParameter(
                parameter.display_name().to_string(),
            ));
        }
        if self.by_id.contains_key(parameter.id()) {
            return Err(ResultsError::DuplicateParameter(parameter.id().to_string()));
        }
        parameter.check_current()?;

        let index = self.parameters.len();
        self.by_display
            .insert(parameter.display_name().to_string(), index);
        self.by_id.insert(parameter.id().to_string(), index);
        self.parameters.push(parameter);
        Ok(())
    }

    /// The parameter with the given id, if any.
    pub fn get_by_id(&self, id: &str) -> Option<&Parameter> {
        self.by_id.get(id).map(|&i| &self.parameters[i])
    }

    /// Assign a value to the parameter with the given id.
    pub fn set_value(&mut self, id: &str, value: impl Into<ParameterValue>) -> AppResult<()> {
        let index = *self
            .by_id
            .get(id)
            .ok_or_else(|| ResultsError::UnknownParameter(id.to_string()))?;
        self.parameters[index].set(value)
    }

    /// Assign several values at once, keyed by id.
    ///
    /// Assignments are independent; the first failure aborts the rest.
    pub fn set_values<I, S>(&mut self, values: I) -> AppResult<()>
    where
        I: IntoIterator<Item = (S, ParameterValue)>,
        S: AsRef<str>,
    {
        for (id, value) in values {
            self.set_value(id.as_ref(), value)?;
        }
        Ok(())
    }

    /// Parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl ParameterStore for ParameterRegistry {
    fn get(&self, display_name: &str) -> Option<&Parameter> {
        self.by_display.get(display_name).map(|&i| &self.parameters[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> ParameterRegistry {
        let mut registry = ParameterRegistry::new();
        registry
            .register(Parameter::text("sample_name", "Sample Name").with_default("test"))
            .unwrap();
        registry
            .register(Parameter::float("pump_power", "Pump Power").with_units("mW"))
            .unwrap();
        registry
            .register(Parameter::boolean("lockin_enabled", "Lock-in Enabled"))
            .unwrap();
        registry
    }

    #[test]
    fn test_lookup_by_display_name() {
        let registry = sample_registry();
        assert!(registry.get("Pump Power").is_some());
        assert!(registry.get("pump_power").is_none()); // ids are not display names
        assert!(registry.get("Pump power").is_none()); // exact match only
    }

    #[test]
    fn test_duplicate_display_name_rejected() {
        let mut registry = sample_registry();
        let err = registry
            .register(Parameter::float("other_id", "Pump Power"))
            .unwrap_err();
        assert!(matches!(err, ResultsError::DuplicateParameter(_)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = sample_registry();
        let err = registry
            .register(Parameter::float("pump_power", "Other Label"))
            .unwrap_err();
        assert!(matches!(err, ResultsError::DuplicateParameter(_)));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let mut registry = ParameterRegistry::new();
        let param = Parameter::float("power", "Pump Power")
            .with_range(0.0, 10.0)
            .with_default(50.0);
        let err = registry.register(param).unwrap_err();
        assert!(matches!(err, ResultsError::OutOfRange { .. }));
    }

    #[test]
    fn test_set_value_by_id() {
        let mut registry = sample_registry();
        registry.set_value("pump_power", 12.5).unwrap();
        let value = registry.get("Pump Power").unwrap().value().unwrap();
        assert_eq!(value, &ParameterValue::Float(12.5));

        let err = registry.set_value("unknown_id", 1.0).unwrap_err();
        assert!(matches!(err, ResultsError::UnknownParameter(_)));
    }

    #[test]
    fn test_set_values_bulk() {
        let mut registry = sample_registry();
        registry
            .set_values([
                ("pump_power", ParameterValue::from(3.5)),
                ("lockin_enabled", ParameterValue::from(true)),
            ])
            .unwrap();
        assert!(registry.get("Lock-in Enabled").unwrap().is_set());
    }

    #[test]
    fn test_iteration_preserves_declaration_order() {
        let registry = sample_registry();
        let names: Vec<&str> = registry.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, ["Sample Name", "Pump Power", "Lock-in Enabled"]);
    }
}
