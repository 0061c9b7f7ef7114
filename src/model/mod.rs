//! Declarative ODE model descriptors
//!
//! A model is described by its states, parameters (with bounds), one
//! right-hand-side expression per state, initial conditions and a time grid.
//! Descriptors are usually read from JSON:
//!
//! ```rust
//! use pkode::model::{parse_model, Validator};
//!
//! let json = r#"{
//!     "states": [
//!         {"name": "A", "unit": "mg", "description": "Depot"},
//!         {"name": "C", "unit": "mg", "description": "Plasma"}
//!     ],
//!     "parameters": [
//!         {"name": "ka", "value": 1.0, "bounds": {"min": 0.1, "max": 5.0}},
//!         {"name": "ke", "value": 0.2, "bounds": {"min": 0.01, "max": 1.0}}
//!     ],
//!     "equations": [
//!         {"lhs": "dA/dt", "rhs": "-ka * A"},
//!         {"lhs": "dC/dt", "rhs": "ka * A - ke * C"}
//!     ],
//!     "initial_conditions": [
//!         {"state": "A", "value": 100.0},
//!         {"state": "C", "value": 0.0}
//!     ],
//!     "time": {"t0": 0.0, "tend": 24.0, "dt": 0.1}
//! }"#;
//!
//! let mut model = parse_model(json)?;
//! model.set_parameter("ke", 0.3)?;
//! let validated = Validator::strict().validate(&model)?;
//! assert_eq!(validated.inner().parameter_names(), vec!["ka", "ke"]);
//! # Ok::<(), pkode::model::ModelError>(())
//! ```
//!
//! # JSON Schema
//!
//! | Field | Description |
//! |-------|-------------|
//! | `states` | Ordered `{name, unit, description}`; order fixes vector positions |
//! | `parameters` | Ordered `{name, value, unit, description, bounds: {min, max}}` |
//! | `equations` | Ordered `{lhs, rhs}`; `equations[i]` defines `d(states[i])/dt` |
//! | `initial_conditions` | `{state, value}`, matched by name |
//! | `time` | `{t0, tend, dt}` |
//!
//! Every top-level field is required; `parameters` may be an empty list.
//! `unit` and `description` may be omitted. Unknown top-level fields are
//! rejected.
//!
//! # Validation
//!
//! Simulation does not require a validated model, but [Validator] reports
//! inconsistencies up front. In strict mode a left-hand side that does not
//! read `d<state>/dt` is an error; otherwise it is logged and ignored.

mod descriptor;
mod errors;
pub mod library;
mod types;
mod validation;

pub use descriptor::ModelDescriptor;
pub use errors::ModelError;
pub use library::ModelLibrary;
pub use types::*;
pub use validation::{ValidatedModel, Validator};

/// Parse a JSON string into a ModelDescriptor
pub fn parse_model(json: &str) -> Result<ModelDescriptor, ModelError> {
    ModelDescriptor::from_str(json)
}

/// Parse and validate a JSON model
pub fn validate_model(json: &str) -> Result<ValidatedModel, ModelError> {
    let model = ModelDescriptor::from_str(json)?;
    Validator::new().validate(&model)
}
