//! Simulation of small ODE models described declaratively.
//!
//! A [ModelDescriptor] lists states, bounded parameters, one symbolic
//! right-hand side per state, initial conditions and a time horizon.
//! [simulate] compiles the right-hand sides, assembles the initial value
//! problem, integrates it with an adaptive Dormand-Prince scheme and returns
//! a [Trajectory] sampled on a uniform grid.
//!
//! ```rust
//! use pkode::prelude::*;
//!
//! let mut model = ModelLibrary::builtin().get("pk/1cmt-oral").unwrap().clone();
//! model.set_parameter("ka", 2.0)?;
//!
//! let traj = simulate(&model)?;
//! let plasma = traj.state("C").unwrap();
//! assert_eq!(traj.t()[0], 0.0);
//! assert_eq!(plasma[0], 0.0);
//! # Ok::<(), PkodeError>(())
//! ```

pub mod error;
pub mod expr;
pub mod model;
pub mod simulator;

pub use error::PkodeError;
pub use model::{ModelDescriptor, ModelError, ModelLibrary, Validator};
pub use simulator::{simulate, simulate_scenarios, simulate_with, SolverOptions, Trajectory};

pub mod prelude {
    pub use crate::expr::{compile, CompiledEvaluator};
    pub use crate::model::{
        parse_model, Bounds, Equation, InitialCondition, ModelDescriptor, ModelError,
        ModelLibrary, Parameter, State, TimeGrid, Validator,
    };
    pub use crate::simulator::{
        assemble, simulate, simulate_scenarios, simulate_with, uniform_grid, Scenario,
        SolverOptions, Trajectory,
    };
    pub use crate::PkodeError;
}
