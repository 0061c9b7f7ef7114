//! Simulation pipeline
//!
//! [simulate] runs a [ModelDescriptor] end to end:
//!
//! 1. compile the right-hand sides against the declared states and
//!    parameters ([crate::expr::compile]);
//! 2. [assemble] the derivative function and initial vector;
//! 3. build the uniform output grid ([uniform_grid]);
//! 4. integrate with Dormand-Prince 5(4) ([integrator::solve]), internal steps
//!    bounded by the grid spacing;
//! 5. sample the continuous solution on the grid into a [Trajectory].
//!
//! ```rust
//! use pkode::model::ModelLibrary;
//! use pkode::simulator::simulate;
//!
//! let model = ModelLibrary::builtin().get("pk/1cmt-iv").unwrap().clone();
//! let traj = simulate(&model)?;
//! assert_eq!(traj.npoints(), 241);
//! assert_eq!(traj.state("C").unwrap()[0], 10.0);
//! # Ok::<(), pkode::PkodeError>(())
//! ```

mod assembler;
mod batch;
mod grid;
pub mod integrator;
mod trajectory;

pub use assembler::{assemble, OdeProblem, Rhs};
pub use batch::{simulate_scenarios, Scenario};
pub use grid::{grid_intervals, uniform_grid};
pub use integrator::{DenseSolution, OdeSystem, SolverOptions};
pub use trajectory::Trajectory;

use std::collections::BTreeMap;

use crate::expr;
use crate::model::ModelDescriptor;
use crate::PkodeError;

pub type T = f64;
pub type V = nalgebra::DVector<T>;

/// Simulate `model` with default [SolverOptions]
pub fn simulate(model: &ModelDescriptor) -> Result<Trajectory, PkodeError> {
    simulate_with(model, &SolverOptions::default())
}

/// Simulate `model` with the given solver options. An unset `max_step` is
/// taken from the model's `dt`.
pub fn simulate_with(
    model: &ModelDescriptor,
    opts: &SolverOptions,
) -> Result<Trajectory, PkodeError> {
    let evaluator = expr::compile(&model.state_names(), &model.parameter_names(), &model.rhs())?;
    let problem = assemble(
        evaluator,
        &model.parameter_values(),
        &model.initial_values(),
    )?;

    let time = model.time;
    let grid = uniform_grid(time.t0, time.tend, time.dt)?;
    let opts = opts.for_spacing(time.dt);

    let solution = integrator::solve(problem.rhs(), problem.y0(), time.t0, time.tend, &opts)?;
    let y = solution.sample(&grid);
    tracing::debug!(
        npoints = grid.len(),
        nsteps = solution.nsteps(),
        "sampled trajectory"
    );

    let parameters: BTreeMap<String, T> = problem
        .parameters()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    Ok(Trajectory::new(
        grid,
        y,
        problem.state_names().to_vec(),
        parameters,
    ))
}
