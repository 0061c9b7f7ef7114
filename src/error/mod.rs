use thiserror::Error;

use crate::expr::ParseError;
use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum PkodeError {
    /// A name is declared twice, either as both a state and a parameter or
    /// twice within one of the lists
    #[error("Name '{name}' is declared more than once across states and parameters")]
    NameCollision { name: String },

    /// An expression references an identifier or function that is not bound
    #[error("Undefined symbol '{name}' in expression '{expression}'")]
    UndefinedSymbol { name: String, expression: String },

    /// Malformed expression syntax
    #[error("Invalid expression '{expression}': {source}")]
    ExpressionParse {
        expression: String,
        #[source]
        source: ParseError,
    },

    #[error("State '{state}' has no initial condition")]
    MissingInitialCondition { state: String },

    #[error("Parameter '{name}' has no value")]
    MissingParameterValue { name: String },

    #[error("Model has {equations} equations for {states} states")]
    EquationCountMismatch { states: usize, equations: usize },

    #[error("Invalid time span: t0 = {t0}, tend = {tend}, dt = {dt}")]
    InvalidTimeSpan { t0: f64, tend: f64, dt: f64 },

    /// The evaluator was called with the wrong number of arguments
    #[error("Evaluator expects {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    /// A batched argument is neither a scalar nor as long as the batch
    #[error("Batch argument {index} has length {len}, expected 1 or {expected}")]
    BatchShape {
        index: usize,
        len: usize,
        expected: usize,
    },

    /// Solver options outside their valid range
    #[error("Invalid solver options: {0}")]
    InvalidSolverOptions(String),

    /// The integrator could not reach the end of the time span
    #[error("Integration failed at t = {t_last}: {reason}")]
    Integration { t_last: f64, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PkodeError {
    pub fn name_collision(name: impl Into<String>) -> Self {
        Self::NameCollision { name: name.into() }
    }

    pub fn undefined_symbol(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::UndefinedSymbol {
            name: name.into(),
            expression: expression.into(),
        }
    }

    pub fn integration(t_last: f64, reason: impl Into<String>) -> Self {
        Self::Integration {
            t_last,
            reason: reason.into(),
        }
    }
}
