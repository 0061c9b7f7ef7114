//! Binds a compiled evaluator to the integrator's calling convention

use std::collections::HashMap;

use crate::expr::CompiledEvaluator;
use crate::simulator::integrator::OdeSystem;
use crate::simulator::{T, V};
use crate::PkodeError;

/// `dy/dt = f(y)` with parameter values fixed at assembly time
#[derive(Debug, Clone)]
pub struct Rhs {
    evaluator: CompiledEvaluator,
    params: Vec<T>,
}

impl Rhs {
    /// Derivative at `(t, y)`. `t` is accepted for the integrator's benefit;
    /// right-hand sides cannot reference it.
    pub fn deriv(&self, t: T, y: &V) -> V {
        let mut dy = V::zeros(y.len());
        self.rhs(t, y, &mut dy);
        dy
    }

    /// Parameter values in evaluator order
    pub fn params(&self) -> &[T] {
        &self.params
    }

    pub fn evaluator(&self) -> &CompiledEvaluator {
        &self.evaluator
    }
}

impl OdeSystem for Rhs {
    fn ndim(&self) -> usize {
        self.evaluator.noutputs()
    }

    #[inline]
    fn rhs(&self, _t: T, y: &V, dy: &mut V) {
        self.evaluator
            .eval_split(y.as_slice(), &self.params, dy.as_mut_slice());
    }
}

/// An initial value problem ready for integration
#[derive(Debug, Clone)]
pub struct OdeProblem {
    rhs: Rhs,
    y0: V,
    state_names: Vec<String>,
}

impl OdeProblem {
    pub fn rhs(&self) -> &Rhs {
        &self.rhs
    }

    pub fn y0(&self) -> &V {
        &self.y0
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    /// `(name, value)` of every parameter, in evaluator order
    pub fn parameters(&self) -> impl Iterator<Item = (&str, T)> {
        self.rhs.evaluator.parameter_names().zip(self.rhs.params.iter().copied())
    }

    /// Derivative at `(t, y)`
    pub fn deriv(&self, t: T, y: &V) -> V {
        self.rhs.deriv(t, y)
    }
}

/// Assemble an [OdeProblem] from a compiled evaluator.
///
/// States are taken in the evaluator's order. Parameter values and initial
/// conditions are looked up by name; both are copied, so later changes to
/// `parameters` do not affect the problem.
pub fn assemble(
    evaluator: CompiledEvaluator,
    parameters: &HashMap<String, T>,
    initial_conditions: &HashMap<String, T>,
) -> Result<OdeProblem, PkodeError> {
    let nstates = evaluator.symbols().nstates();
    if evaluator.noutputs() != nstates {
        return Err(PkodeError::EquationCountMismatch {
            states: nstates,
            equations: evaluator.noutputs(),
        });
    }

    let params = evaluator
        .parameter_names()
        .map(|name| {
            parameters
                .get(name)
                .copied()
                .ok_or_else(|| PkodeError::MissingParameterValue {
                    name: name.to_string(),
                })
        })
        .collect::<Result<Vec<T>, _>>()?;

    let state_names: Vec<String> = evaluator.state_names().map(str::to_string).collect();
    let y0 = state_names
        .iter()
        .map(|name| {
            initial_conditions
                .get(name)
                .copied()
                .ok_or_else(|| PkodeError::MissingInitialCondition {
                    state: name.clone(),
                })
        })
        .collect::<Result<Vec<T>, _>>()?;

    tracing::debug!(
        nstates,
        nparams = params.len(),
        "assembled initial value problem"
    );

    Ok(OdeProblem {
        rhs: Rhs { evaluator, params },
        y0: V::from_vec(y0),
        state_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::compile;

    fn map(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn orders_initial_vector_by_state() {
        let f = compile(&["A", "C"], &["ka", "ke"], &["-ka*A", "ka*A - ke*C"]).unwrap();
        let problem = assemble(
            f,
            &map(&[("ke", 0.2), ("ka", 1.0)]),
            &map(&[("C", 0.0), ("A", 100.0)]),
        )
        .unwrap();
        assert_eq!(problem.y0().as_slice(), &[100.0, 0.0]);
        assert_eq!(problem.rhs().params(), &[1.0, 0.2]);
        let dy = problem.deriv(0.0, problem.y0());
        assert_eq!(dy.as_slice(), &[-100.0, 100.0]);
    }

    #[test]
    fn parameters_are_snapshotted() {
        let f = compile(&["C"], &["k"], &["-k*C"]).unwrap();
        let mut params = map(&[("k", 0.2)]);
        let problem = assemble(f, &params, &map(&[("C", 10.0)])).unwrap();
        params.insert("k".into(), 0.5);
        let dy = problem.deriv(0.0, problem.y0());
        assert_eq!(dy[0], -2.0);
        assert_eq!(problem.parameters().collect::<Vec<_>>(), vec![("k", 0.2)]);
    }

    #[test]
    fn missing_initial_condition() {
        let f = compile(&["A", "C"], &["ka"], &["-ka*A", "ka*A"]).unwrap();
        let err = assemble(f, &map(&[("ka", 1.0)]), &map(&[("A", 1.0)])).unwrap_err();
        assert!(matches!(err, PkodeError::MissingInitialCondition { state } if state == "C"));
    }

    #[test]
    fn missing_parameter_value() {
        let f = compile(&["C"], &["k"], &["-k*C"]).unwrap();
        let err = assemble(f, &HashMap::new(), &map(&[("C", 1.0)])).unwrap_err();
        assert!(matches!(err, PkodeError::MissingParameterValue { name } if name == "k"));
    }

    #[test]
    fn equation_count_mismatch() {
        let f = compile(&["A", "C"], &["k"], &["-k*A"]).unwrap();
        let err = assemble(f, &map(&[("k", 1.0)]), &map(&[("A", 1.0), ("C", 1.0)])).unwrap_err();
        assert!(matches!(
            err,
            PkodeError::EquationCountMismatch {
                states: 2,
                equations: 1
            }
        ));
    }

    #[test]
    fn problem_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OdeProblem>();
    }
}
