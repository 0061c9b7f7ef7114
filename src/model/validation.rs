//! Validation for model descriptors
//!
//! The simulation pipeline itself only relies on positional correspondence
//! between states, equations and the symbol table. The checks here are an
//! optional pre-flight that catches inconsistent documents before any
//! integration is attempted.

use std::collections::HashSet;

use crate::expr::ExpressionCompiler;
use crate::model::descriptor::ModelDescriptor;
use crate::model::errors::ModelError;
use crate::PkodeError;

/// A validated model descriptor
///
/// This wrapper type guarantees that the contained model has passed
/// all validation checks and is ready for simulation.
#[derive(Debug, Clone)]
pub struct ValidatedModel(ModelDescriptor);

impl ValidatedModel {
    /// Get the inner descriptor
    pub fn inner(&self) -> &ModelDescriptor {
        &self.0
    }

    /// Consume the wrapper and return the inner descriptor
    pub fn into_inner(self) -> ModelDescriptor {
        self.0
    }
}

impl AsRef<ModelDescriptor> for ValidatedModel {
    fn as_ref(&self) -> &ModelDescriptor {
        &self.0
    }
}

/// Validator for model descriptors
pub struct Validator {
    /// Whether to treat warnings as errors
    strict: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Create a strict validator that treats warnings as errors
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate a model descriptor
    pub fn validate(&self, model: &ModelDescriptor) -> Result<ValidatedModel, ModelError> {
        // 1. Names
        self.validate_names(model)?;

        // 2. Parameter bounds and values
        self.validate_parameters(model)?;

        // 3. Equations line up with states
        self.validate_equations(model)?;

        // 4. Initial conditions
        self.validate_initial_conditions(model)?;

        // 5. Time grid
        self.validate_time(model)?;

        // 6. Right-hand sides compile
        self.validate_expressions(model)?;

        Ok(ValidatedModel(model.clone()))
    }

    fn validate_names(&self, model: &ModelDescriptor) -> Result<(), ModelError> {
        if model.states.is_empty() {
            return Err(ModelError::NoStates);
        }

        let mut states = HashSet::new();
        for state in &model.states {
            if !states.insert(state.name.as_str()) {
                return Err(ModelError::DuplicateState {
                    name: state.name.clone(),
                });
            }
        }

        let mut params = HashSet::new();
        for param in &model.parameters {
            if states.contains(param.name.as_str()) {
                return Err(ModelError::NameCollision {
                    name: param.name.clone(),
                });
            }
            if !params.insert(param.name.as_str()) {
                return Err(ModelError::DuplicateParameter {
                    name: param.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_parameters(&self, model: &ModelDescriptor) -> Result<(), ModelError> {
        for param in &model.parameters {
            let bounds = param.bounds;
            if !bounds.is_valid() {
                return Err(ModelError::InvalidBounds {
                    name: param.name.clone(),
                    min: bounds.min,
                    max: bounds.max,
                });
            }
            if !param.value.is_finite() || !bounds.contains(param.value) {
                return Err(ModelError::out_of_bounds(
                    &param.name,
                    param.value,
                    bounds.min,
                    bounds.max,
                ));
            }
        }
        Ok(())
    }

    fn validate_equations(&self, model: &ModelDescriptor) -> Result<(), ModelError> {
        if model.equations.len() != model.states.len() {
            return Err(ModelError::EquationCountMismatch {
                states: model.states.len(),
                equations: model.equations.len(),
            });
        }

        for (index, (eq, state)) in model.equations.iter().zip(&model.states).enumerate() {
            if eq.lhs_matches(&state.name) {
                continue;
            }
            if self.strict {
                return Err(ModelError::LhsMismatch {
                    index,
                    lhs: eq.lhs.clone(),
                    state: state.name.clone(),
                });
            }
            tracing::warn!(
                index,
                lhs = %eq.lhs,
                state = %state.name,
                "equation left-hand side does not name its state; position is used"
            );
        }
        Ok(())
    }

    fn validate_initial_conditions(&self, model: &ModelDescriptor) -> Result<(), ModelError> {
        let states: HashSet<_> = model.states.iter().map(|s| s.name.as_str()).collect();
        let mut seen = HashSet::new();
        for ic in &model.initial_conditions {
            if !states.contains(ic.state.as_str()) {
                return Err(ModelError::UnknownInitialCondition {
                    state: ic.state.clone(),
                });
            }
            if !seen.insert(ic.state.as_str()) {
                return Err(ModelError::DuplicateInitialCondition {
                    state: ic.state.clone(),
                });
            }
        }

        if let Some(state) = model
            .states
            .iter()
            .find(|s| !seen.contains(s.name.as_str()))
        {
            return Err(ModelError::MissingInitialCondition {
                state: state.name.clone(),
            });
        }
        Ok(())
    }

    fn validate_time(&self, model: &ModelDescriptor) -> Result<(), ModelError> {
        let time = model.time;
        if !time.is_valid() {
            return Err(ModelError::InvalidTimeGrid {
                t0: time.t0,
                tend: time.tend,
                dt: time.dt,
            });
        }
        Ok(())
    }

    // Compile each equation on its own so failures point at the equation
    fn validate_expressions(&self, model: &ModelDescriptor) -> Result<(), ModelError> {
        let compiler = ExpressionCompiler::new(&model.state_names(), &model.parameter_names())
            .map_err(|e| match e {
                PkodeError::NameCollision { name } => ModelError::NameCollision { name },
                other => ModelError::Expression {
                    index: 0,
                    lhs: String::new(),
                    source: Box::new(other),
                },
            })?;

        for (index, eq) in model.equations.iter().enumerate() {
            compiler
                .parse(&eq.rhs)
                .map_err(|source| ModelError::Expression {
                    index,
                    lhs: eq.lhs.clone(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::*;

    fn depot_plasma() -> ModelDescriptor {
        ModelDescriptor {
            states: vec![State::new("A"), State::new("C")],
            parameters: vec![
                Parameter::new("ka", 1.0, Bounds::new(0.1, 5.0)),
                Parameter::new("ke", 0.2, Bounds::new(0.01, 1.0)),
            ],
            equations: vec![
                Equation::for_state("A", "-ka * A"),
                Equation::for_state("C", "ka * A - ke * C"),
            ],
            initial_conditions: vec![
                InitialCondition::new("A", 100.0),
                InitialCondition::new("C", 0.0),
            ],
            time: TimeGrid::new(0.0, 24.0, 0.1),
        }
    }

    #[test]
    fn accepts_consistent_model() {
        let validated = Validator::strict().validate(&depot_plasma()).unwrap();
        assert_eq!(validated.inner().states.len(), 2);
    }

    #[test]
    fn rejects_empty_states() {
        let mut model = depot_plasma();
        model.states.clear();
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::NoStates)
        ));
    }

    #[test]
    fn rejects_duplicate_and_colliding_names() {
        let mut model = depot_plasma();
        model.states[1].name = "A".into();
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::DuplicateState { name }) if name == "A"
        ));

        let mut model = depot_plasma();
        model.parameters[1].name = "C".into();
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::NameCollision { name }) if name == "C"
        ));

        let mut model = depot_plasma();
        model.parameters[1].name = "ka".into();
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn rejects_bad_bounds() {
        let mut model = depot_plasma();
        model.parameters[0].bounds = Bounds::new(5.0, 0.1);
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::InvalidBounds { .. })
        ));

        let mut model = depot_plasma();
        model.parameters[0].value = 10.0;
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::ParameterOutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_equation_count_mismatch() {
        let mut model = depot_plasma();
        model.equations.pop();
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::EquationCountMismatch {
                states: 2,
                equations: 1
            })
        ));
    }

    #[test]
    fn lhs_mismatch_is_lenient_unless_strict() {
        let mut model = depot_plasma();
        model.equations[1].lhs = "dCp/dt".into();
        assert!(Validator::new().validate(&model).is_ok());
        assert!(matches!(
            Validator::strict().validate(&model),
            Err(ModelError::LhsMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn initial_condition_checks() {
        let mut model = depot_plasma();
        model.initial_conditions.pop();
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::MissingInitialCondition { state }) if state == "C"
        ));

        let mut model = depot_plasma();
        model.initial_conditions.push(InitialCondition::new("A", 1.0));
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::DuplicateInitialCondition { .. })
        ));

        let mut model = depot_plasma();
        model.initial_conditions.push(InitialCondition::new("B", 1.0));
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::UnknownInitialCondition { .. })
        ));
    }

    #[test]
    fn rejects_invalid_time_grid() {
        let mut model = depot_plasma();
        model.time = TimeGrid::new(0.0, 24.0, -0.1);
        assert!(matches!(
            Validator::new().validate(&model),
            Err(ModelError::InvalidTimeGrid { .. })
        ));
    }

    #[test]
    fn expression_errors_point_at_equation() {
        let mut model = depot_plasma();
        model.equations[1].rhs = "ka * A - kk * C".into();
        match Validator::new().validate(&model) {
            Err(ModelError::Expression { index, source, .. }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, PkodeError::UndefinedSymbol { ref name, .. } if name == "kk"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
