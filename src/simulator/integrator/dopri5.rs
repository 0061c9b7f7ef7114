//! Dormand-Prince 5(4) with FSAL, local extrapolation and a fourth-order
//! continuous extension.

use nalgebra::DMatrix;

use crate::simulator::integrator::dense::{DenseSolution, Segment};
use crate::simulator::integrator::{OdeSystem, SolverOptions};
use crate::simulator::{T, V};
use crate::PkodeError;

// ═══════════════════════════════════════════════════════════════════════════════
// Tableau
// ═══════════════════════════════════════════════════════════════════════════════

const STAGES: usize = 6;

const C: [T; STAGES] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[T; 5]; STAGES] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

// Fifth-order weights, used to advance the solution
const B: [T; STAGES] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

// Difference between the fifth- and fourth-order solutions, including the
// FSAL stage
const E: [T; STAGES + 1] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

// Continuous extension coefficients, one row per stage, powers θ¹..θ⁴
const P: [[T; 4]; STAGES + 1] = [
    [
        1.0,
        -8048581381.0 / 2820520608.0,
        8663915743.0 / 2820520608.0,
        -12715105075.0 / 11282082432.0,
    ],
    [0.0, 0.0, 0.0, 0.0],
    [
        0.0,
        131558114200.0 / 32700410799.0,
        -68118460800.0 / 10900136933.0,
        87487479700.0 / 32700410799.0,
    ],
    [
        0.0,
        -1754552775.0 / 470086768.0,
        14199869525.0 / 1410260304.0,
        -10690763975.0 / 1880347072.0,
    ],
    [
        0.0,
        127303824393.0 / 49829197408.0,
        -318862633887.0 / 49829197408.0,
        701980252875.0 / 199316789632.0,
    ],
    [
        0.0,
        -282668133.0 / 205662961.0,
        2019193451.0 / 616988883.0,
        -1453857185.0 / 822651844.0,
    ],
    [
        0.0,
        40617522.0 / 29380423.0,
        -110615467.0 / 29380423.0,
        69997945.0 / 29380423.0,
    ],
];

const ERROR_ORDER: T = 4.0;
const SAFETY: T = 0.9;
const MIN_FACTOR: T = 0.2;
const MAX_FACTOR: T = 10.0;
// A remainder to `tend` below this fraction of the step is folded into it
const END_SNAP: T = 1e-3;

// ═══════════════════════════════════════════════════════════════════════════════
// Driver
// ═══════════════════════════════════════════════════════════════════════════════

/// Integrate `system` from `(t0, y0)` to `tend`.
///
/// Every accepted step is kept as a [Segment] of the returned solution. Fails
/// with [PkodeError::Integration] when the derivative is non-finite at the
/// start, when the step size collapses below the resolution of `t`, or when
/// a budget set through `opts.max_steps` is spent before reaching `tend`.
pub fn solve<S: OdeSystem>(
    system: &S,
    y0: &V,
    t0: T,
    tend: T,
    opts: &SolverOptions,
) -> Result<DenseSolution, PkodeError> {
    opts.validate()?;
    let n = system.ndim();
    if y0.len() != n {
        return Err(PkodeError::integration(
            t0,
            format!("initial state has {} values for {} states", y0.len(), n),
        ));
    }
    if !(t0.is_finite() && tend.is_finite() && t0 < tend) {
        return Err(PkodeError::integration(
            t0,
            format!("cannot integrate from {} to {}", t0, tend),
        ));
    }
    if !all_finite(y0) {
        return Err(PkodeError::integration(t0, "non-finite initial state"));
    }

    let max_step = opts.max_step.unwrap_or(T::INFINITY);
    let mut solution = DenseSolution::new(t0, y0.clone());

    let mut t = t0;
    let mut y = y0.clone();
    let mut f = V::zeros(n);
    system.rhs(t, &y, &mut f);
    if !all_finite(&f) {
        return Err(PkodeError::integration(t0, "non-finite derivative"));
    }

    let mut h_abs = match opts.h0 {
        Some(h0) => h0.min(max_step).min(tend - t0),
        None => initial_step(system, t0, &y, &f, tend - t0, max_step, opts),
    };

    let mut k: Vec<V> = (0..=STAGES).map(|_| V::zeros(n)).collect();
    let mut y_new = V::zeros(n);
    let mut f_new = V::zeros(n);
    let mut attempts = 0usize;

    while t < tend {
        let min_step = 10.0 * (T::EPSILON * t.abs()).max(T::MIN_POSITIVE);
        h_abs = h_abs.clamp(min_step, max_step.max(min_step));

        let mut rejected = false;
        let mut non_finite = false;
        loop {
            if h_abs < min_step {
                let reason = if non_finite {
                    "non-finite derivative or state"
                } else {
                    "step size fell below the resolution of t"
                };
                return Err(PkodeError::integration(t, reason));
            }
            attempts += 1;
            if let Some(budget) = opts.max_steps.filter(|&b| attempts > b) {
                return Err(PkodeError::integration(
                    t,
                    format!("exceeded the budget of {} steps", budget),
                ));
            }

            let mut t_new = t + h_abs;
            if t_new > tend || tend - t_new <= END_SNAP * h_abs {
                t_new = tend;
            }
            let h = t_new - t;

            rk_step(system, t, &y, &f, h, &mut k, &mut y_new, &mut f_new);

            if !all_finite(&y_new) || !all_finite(&f_new) {
                non_finite = true;
                rejected = true;
                h_abs = h * MIN_FACTOR;
                tracing::trace!(t, h, "rejected step: non-finite values");
                continue;
            }
            non_finite = false;

            let error = error_norm(&k, h, &y, &y_new, opts);
            if error < 1.0 {
                let mut factor = if error == 0.0 {
                    MAX_FACTOR
                } else {
                    MAX_FACTOR.min(SAFETY * error.powf(-1.0 / (ERROR_ORDER + 1.0)))
                };
                if rejected {
                    factor = factor.min(1.0);
                }
                h_abs = h * factor;

                let q = dense_coefficients(&k);
                solution.push(
                    Segment {
                        t_start: t,
                        t_end: t_new,
                        y_start: y.clone(),
                        q,
                    },
                    &y_new,
                );
                t = t_new;
                std::mem::swap(&mut y, &mut y_new);
                std::mem::swap(&mut f, &mut f_new);
                break;
            }

            h_abs = h * MIN_FACTOR.max(SAFETY * error.powf(-1.0 / (ERROR_ORDER + 1.0)));
            rejected = true;
            tracing::trace!(t, h, error, "rejected step");
        }
    }

    tracing::debug!(
        nsteps = solution.nsteps(),
        attempts,
        t_final = t,
        "integration finished"
    );
    Ok(solution)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn all_finite(v: &V) -> bool {
    v.iter().all(|x| x.is_finite())
}

fn rms(v: &V) -> T {
    if v.is_empty() {
        return 0.0;
    }
    v.norm() / (v.len() as T).sqrt()
}

/// One Dormand-Prince step of size `h`. `k[0]` receives `f`, `k[6]` the
/// derivative at the new point.
#[allow(clippy::too_many_arguments)]
fn rk_step<S: OdeSystem>(
    system: &S,
    t: T,
    y: &V,
    f: &V,
    h: T,
    k: &mut [V],
    y_new: &mut V,
    f_new: &mut V,
) {
    k[0].copy_from(f);
    let mut stage = y.clone();
    for s in 1..STAGES {
        stage.copy_from(y);
        for (j, a) in A[s].iter().take(s).enumerate() {
            stage.axpy(h * a, &k[j], 1.0);
        }
        system.rhs(t + C[s] * h, &stage, &mut k[s]);
    }

    y_new.copy_from(y);
    for (j, b) in B.iter().enumerate() {
        y_new.axpy(h * b, &k[j], 1.0);
    }
    system.rhs(t + h, y_new, f_new);
    k[STAGES].copy_from(f_new);
}

fn error_norm(k: &[V], h: T, y: &V, y_new: &V, opts: &SolverOptions) -> T {
    let mut err = V::zeros(y.len());
    for (kj, e) in k.iter().zip(E.iter()) {
        err.axpy(h * e, kj, 1.0);
    }
    for i in 0..err.len() {
        let scale = opts.atol + y[i].abs().max(y_new[i].abs()) * opts.rtol;
        err[i] /= scale;
    }
    rms(&err)
}

// q = Kᵀ P, an (ndim × 4) matrix
fn dense_coefficients(k: &[V]) -> DMatrix<T> {
    let n = k[0].len();
    let mut q = DMatrix::zeros(n, 4);
    for (kj, row) in k.iter().zip(P.iter()) {
        for (col, p) in row.iter().enumerate() {
            if *p != 0.0 {
                q.column_mut(col).axpy(*p, kj, 1.0);
            }
        }
    }
    q
}

/// Starting step from the size of the state and its first two derivatives
fn initial_step<S: OdeSystem>(
    system: &S,
    t0: T,
    y0: &V,
    f0: &V,
    span: T,
    max_step: T,
    opts: &SolverOptions,
) -> T {
    let scale = y0.map(|y| opts.atol + y.abs() * opts.rtol);
    let d0 = rms(&y0.component_div(&scale));
    let d1 = rms(&f0.component_div(&scale));
    let guess = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = guess.min(span);

    let y1 = y0 + f0 * h0;
    let mut f1 = V::zeros(y0.len());
    system.rhs(t0 + h0, &y1, &mut f1);
    let d2 = rms(&(&f1 - f0).component_div(&scale)) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (ERROR_ORDER + 1.0))
    };

    let h = (100.0 * h0).min(h1).min(span).min(max_step);
    // a non-finite trial evaluation falls back to the small first guess
    if h.is_finite() && h > 0.0 {
        h
    } else {
        h0.min(max_step)
    }
}
