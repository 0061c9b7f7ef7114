use std::collections::HashMap;

use rayon::prelude::*;

use crate::model::ModelDescriptor;
use crate::simulator::integrator::SolverOptions;
use crate::simulator::trajectory::Trajectory;
use crate::simulator::{simulate_with, T};
use crate::PkodeError;

/// Parameter overrides for one run
pub type Scenario = HashMap<String, T>;

/// Simulate `model` once per scenario, in parallel.
///
/// Each scenario overrides some parameter values (within their bounds) and
/// runs the full pipeline on its own copy of the model. Results are returned
/// in scenario order; a failing scenario does not affect the others.
pub fn simulate_scenarios(
    model: &ModelDescriptor,
    scenarios: &[Scenario],
    opts: &SolverOptions,
) -> Vec<Result<Trajectory, PkodeError>> {
    tracing::debug!(nscenarios = scenarios.len(), "simulating scenarios");
    scenarios
        .par_iter()
        .map(|scenario| {
            let model = model.with_overrides(scenario.iter().map(|(k, v)| (k.as_str(), *v)))?;
            simulate_with(&model, opts)
        })
        .collect()
}
