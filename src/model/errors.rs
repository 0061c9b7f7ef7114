//! Error types for model descriptors

use thiserror::Error;

use crate::PkodeError;

/// Errors raised while reading, editing or pre-checking a model descriptor
#[derive(Debug, Error)]
pub enum ModelError {
    // ─────────────────────────────────────────────────────────────────────────
    // Parsing Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse JSON
    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The model declares no states
    #[error("Model must declare at least one state")]
    NoStates,

    /// Duplicate state name
    #[error("Duplicate state name: '{name}'")]
    DuplicateState { name: String },

    /// Duplicate parameter name
    #[error("Duplicate parameter name: '{name}'")]
    DuplicateParameter { name: String },

    /// A name used for both a state and a parameter
    #[error("'{name}' is declared as both a state and a parameter")]
    NameCollision { name: String },

    /// Equation count differs from state count
    #[error("Model has {equations} equations for {states} states")]
    EquationCountMismatch { states: usize, equations: usize },

    /// Equation left-hand side does not name the state at its position
    #[error("Equation {index} has left-hand side '{lhs}', expected 'd{state}/dt'")]
    LhsMismatch {
        index: usize,
        lhs: String,
        state: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Initial Conditions
    // ─────────────────────────────────────────────────────────────────────────
    #[error("State '{state}' has no initial condition")]
    MissingInitialCondition { state: String },

    #[error("State '{state}' has more than one initial condition")]
    DuplicateInitialCondition { state: String },

    #[error("Initial condition given for undeclared state '{state}'")]
    UnknownInitialCondition { state: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Parameter '{name}' has bounds [{min}, {max}] with min > max")]
    InvalidBounds { name: String, min: f64, max: f64 },

    #[error("Value {value} for parameter '{name}' is outside its bounds [{min}, {max}]")]
    ParameterOutOfBounds {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Time Grid
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid time grid: t0 = {t0}, tend = {tend}, dt = {dt}")]
    InvalidTimeGrid { t0: f64, tend: f64, dt: f64 },

    // ─────────────────────────────────────────────────────────────────────────
    // Expression Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A right-hand side failed to compile
    #[error("Equation {index} ('{lhs}'): {source}")]
    Expression {
        index: usize,
        lhs: String,
        #[source]
        source: Box<PkodeError>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Library Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Model not found in library
    #[error("Model '{0}' not found in library")]
    ModelNotFound(String),
}

impl ModelError {
    pub fn out_of_bounds(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::ParameterOutOfBounds {
            name: name.into(),
            value,
            min,
            max,
        }
    }

    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        Self::UnknownParameter { name: name.into() }
    }
}
