//! Core type definitions for model descriptors

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// States and Parameters
// ═══════════════════════════════════════════════════════════════════════════════

/// A time-varying quantity whose derivative is defined by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: String::new(),
            description: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Closed interval a parameter value must stay in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// A constant of the model, adjustable between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    pub bounds: Bounds,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: f64, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            value,
            unit: String::new(),
            description: String::new(),
            bounds,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Resolution for interactive adjustment: 1/200 of the bounded range,
    /// never below `1e-4`.
    pub fn slider_step(&self) -> f64 {
        ((self.bounds.max - self.bounds.min) / 200.0).max(1e-4)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Equations and Initial Conditions
// ═══════════════════════════════════════════════════════════════════════════════

/// Time-derivative definition. `equations[i]` belongs to `states[i]`; the
/// `lhs` text (for instance `dC/dt`) is descriptive only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub lhs: String,
    pub rhs: String,
}

impl Equation {
    pub fn new(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Equation for `state` written as `d<state>/dt = rhs`
    pub fn for_state(state: &str, rhs: impl Into<String>) -> Self {
        Self::new(format!("d{}/dt", state), rhs)
    }

    /// Whether the left-hand side reads `d<state>/dt`, ignoring whitespace
    pub fn lhs_matches(&self, state: &str) -> bool {
        let lhs: String = self.lhs.chars().filter(|c| !c.is_whitespace()).collect();
        lhs.strip_prefix('d')
            .and_then(|rest| rest.strip_suffix("/dt"))
            .is_some_and(|name| name == state)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialCondition {
    pub state: String,
    pub value: f64,
}

impl InitialCondition {
    pub fn new(state: impl Into<String>, value: f64) -> Self {
        Self {
            state: state.into(),
            value,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Time Grid
// ═══════════════════════════════════════════════════════════════════════════════

/// Integration span and output resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub t0: f64,
    pub tend: f64,
    pub dt: f64,
}

impl TimeGrid {
    pub fn new(t0: f64, tend: f64, dt: f64) -> Self {
        Self { t0, tend, dt }
    }

    /// `t0 < tend`, `dt > 0`, all finite
    pub fn is_valid(&self) -> bool {
        self.t0.is_finite()
            && self.tend.is_finite()
            && self.dt.is_finite()
            && self.t0 < self.tend
            && self.dt > 0.0
    }
}
