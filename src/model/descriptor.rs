//! Main model descriptor struct

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::errors::ModelError;
use crate::model::types::*;

/// A declaratively described ODE model
///
/// This is the in-memory form of the document produced by the model
/// extraction step (or written by hand). State order defines the position of
/// every state in the vectors used downstream.
///
/// # Example
///
/// ```rust
/// use pkode::model::ModelDescriptor;
///
/// let json = r#"{
///   "states": [{"name": "C", "unit": "mg/L", "description": "Plasma concentration"}],
///   "parameters": [{"name": "k", "value": 0.2, "unit": "1/h", "description": "Elimination",
///                   "bounds": {"min": 0.05, "max": 0.5}}],
///   "equations": [{"lhs": "dC/dt", "rhs": "-k * C"}],
///   "initial_conditions": [{"state": "C", "value": 10.0}],
///   "time": {"t0": 0.0, "tend": 24.0, "dt": 0.1}
/// }"#;
///
/// let model = ModelDescriptor::from_str(json)?;
/// assert_eq!(model.state_names(), vec!["C"]);
/// # Ok::<(), pkode::model::ModelError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescriptor {
    pub states: Vec<State>,
    pub parameters: Vec<Parameter>,
    pub equations: Vec<Equation>,
    pub initial_conditions: Vec<InitialCondition>,
    pub time: TimeGrid,
}

impl ModelDescriptor {
    /// Parse a descriptor from a JSON string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a descriptor from an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, ModelError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn state_names(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Right-hand sides in state order
    pub fn rhs(&self) -> Vec<&str> {
        self.equations.iter().map(|e| e.rhs.as_str()).collect()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Current parameter values by name
    pub fn parameter_values(&self) -> HashMap<String, f64> {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.value))
            .collect()
    }

    /// Initial values by state name. When a state is listed twice the last
    /// entry wins.
    pub fn initial_values(&self) -> HashMap<String, f64> {
        self.initial_conditions
            .iter()
            .map(|ic| (ic.state.clone(), ic.value))
            .collect()
    }

    /// Override a parameter value. The value must lie within the parameter's
    /// bounds.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ModelError> {
        let parameter = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ModelError::unknown_parameter(name))?;
        if !value.is_finite() || !parameter.bounds.contains(value) {
            return Err(ModelError::out_of_bounds(
                name,
                value,
                parameter.bounds.min,
                parameter.bounds.max,
            ));
        }
        parameter.value = value;
        Ok(())
    }

    /// Copy of the descriptor with several parameters overridden
    pub fn with_overrides<'a, I>(&self, overrides: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut model = self.clone();
        for (name, value) in overrides {
            model.set_parameter(name, value)?;
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_compartment() -> ModelDescriptor {
        ModelDescriptor {
            states: vec![State::new("C").with_unit("mg/L")],
            parameters: vec![Parameter::new("k", 0.2, Bounds::new(0.05, 0.5))],
            equations: vec![Equation::for_state("C", "-k * C")],
            initial_conditions: vec![InitialCondition::new("C", 10.0)],
            time: TimeGrid::new(0.0, 24.0, 0.1),
        }
    }

    #[test]
    fn json_round_trip() {
        let model = one_compartment();
        let json = model.to_json().unwrap();
        assert_eq!(ModelDescriptor::from_str(&json).unwrap(), model);
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = r#"{
            "states": [], "parameters": [], "equations": [], "initial_conditions": [],
            "time": {"t0": 0, "tend": 1, "dt": 0.1}, "solver": "bdf"
        }"#;
        assert!(matches!(
            ModelDescriptor::from_str(json),
            Err(ModelError::ParseError(_))
        ));
    }

    #[test]
    fn parameters_are_required_but_may_be_empty() {
        let missing = r#"{
            "states": [{"name": "A"}],
            "equations": [{"lhs": "dA/dt", "rhs": "1"}],
            "initial_conditions": [{"state": "A", "value": 0}],
            "time": {"t0": 0, "tend": 1, "dt": 0.1}
        }"#;
        assert!(matches!(
            ModelDescriptor::from_str(missing),
            Err(ModelError::ParseError(_))
        ));

        let empty = missing.replace(r#""states""#, r#""parameters": [], "states""#);
        let model = ModelDescriptor::from_str(&empty).unwrap();
        assert!(model.parameters.is_empty());
    }

    #[test]
    fn set_parameter_within_bounds() {
        let mut model = one_compartment();
        model.set_parameter("k", 0.5).unwrap();
        assert_eq!(model.parameter("k").unwrap().value, 0.5);
        assert_eq!(model.parameter_values()["k"], 0.5);
    }

    #[test]
    fn set_parameter_out_of_bounds() {
        let mut model = one_compartment();
        let err = model.set_parameter("k", 0.6).unwrap_err();
        assert!(matches!(err, ModelError::ParameterOutOfBounds { value, .. } if value == 0.6));
        assert!(model.set_parameter("k", f64::NAN).is_err());
        assert_eq!(model.parameter("k").unwrap().value, 0.2);
    }

    #[test]
    fn set_unknown_parameter() {
        let mut model = one_compartment();
        assert!(matches!(
            model.set_parameter("ke", 0.1),
            Err(ModelError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn overrides_leave_original_untouched() {
        let model = one_compartment();
        let overridden = model.with_overrides([("k", 0.1)]).unwrap();
        assert_eq!(overridden.parameter("k").unwrap().value, 0.1);
        assert_eq!(model.parameter("k").unwrap().value, 0.2);
    }
}
