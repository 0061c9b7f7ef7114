//! Adaptive explicit Runge-Kutta integration
//!
//! [solve] integrates an [OdeSystem] with the Dormand-Prince 5(4) pair and
//! returns a [DenseSolution] that can be evaluated anywhere in the span.
//!
//! | Option | Default | Meaning |
//! |--------|---------|---------|
//! | `rtol` | `1e-3` | relative tolerance |
//! | `atol` | `1e-6` | absolute tolerance |
//! | `h0` | automatic | first step size |
//! | `max_step` | output `dt` | upper bound on any internal step |
//! | `max_steps` | unlimited | accepted plus rejected step budget |

mod dense;
mod dopri5;

pub use dense::{DenseSolution, Segment};
pub use dopri5::solve;

use serde::{Deserialize, Serialize};

use crate::simulator::{T, V};
use crate::PkodeError;

/// Right-hand side of `dy/dt = f(t, y)`
pub trait OdeSystem {
    /// Number of state variables
    fn ndim(&self) -> usize;

    /// Evaluate `f(t, y)` into `dy`. Both vectors have length `ndim()`.
    fn rhs(&self, t: T, y: &V, dy: &mut V);
}

impl<S: OdeSystem + ?Sized> OdeSystem for &S {
    fn ndim(&self) -> usize {
        (**self).ndim()
    }

    fn rhs(&self, t: T, y: &V, dy: &mut V) {
        (**self).rhs(t, y, dy)
    }
}

/// Configuration for the integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub rtol: f64,
    pub atol: f64,
    /// First step size; `None` selects it from the problem
    pub h0: Option<f64>,
    /// Largest internal step; `None` uses the output spacing
    pub max_step: Option<f64>,
    /// Step attempt budget; `None` integrates until `tend` or step collapse
    pub max_steps: Option<usize>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            h0: None,
            max_step: None,
            max_steps: None,
        }
    }
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_h0(mut self, h0: f64) -> Self {
        self.h0 = Some(h0);
        self
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Fill in `max_step` from the output spacing if unset
    pub fn for_spacing(mut self, dt: f64) -> Self {
        self.max_step.get_or_insert(dt);
        self
    }

    pub fn validate(&self) -> Result<(), PkodeError> {
        let invalid = |msg: &str| Err(PkodeError::InvalidSolverOptions(msg.to_string()));
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return invalid("rtol must be finite and > 0");
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return invalid("atol must be finite and > 0");
        }
        if self.h0.is_some_and(|h| !h.is_finite() || h <= 0.0) {
            return invalid("h0 must be finite and > 0");
        }
        if self.max_step.is_some_and(|h| h.is_nan() || h <= 0.0) {
            return invalid("max_step must be > 0");
        }
        if self.max_steps == Some(0) {
            return invalid("max_steps must be > 0");
        }
        Ok(())
    }
}
