use ndarray::Array1;

use crate::simulator::T;
use crate::PkodeError;

/// Number of intervals of the output grid: `round((tend - t0) / dt)`, at
/// least one.
pub fn grid_intervals(t0: T, tend: T, dt: T) -> Result<usize, PkodeError> {
    let valid = t0.is_finite() && tend.is_finite() && dt.is_finite() && t0 < tend && dt > 0.0;
    let intervals = ((tend - t0) / dt).round();
    if !valid || !intervals.is_finite() || intervals >= u32::MAX as T {
        return Err(PkodeError::InvalidTimeSpan { t0, tend, dt });
    }
    Ok((intervals as usize).max(1))
}

/// Uniform output grid from `t0` to `tend`, both included exactly.
///
/// The spacing is `(tend - t0) / round((tend - t0) / dt)`, so it equals `dt`
/// whenever `dt` divides the span. A `dt` larger than the span gives the two
/// endpoints.
pub fn uniform_grid(t0: T, tend: T, dt: T) -> Result<Array1<T>, PkodeError> {
    let n = grid_intervals(t0, tend, dt)?;
    let step = (tend - t0) / n as T;
    let mut grid = Array1::from_shape_fn(n + 1, |i| t0 + i as T * step);
    grid[n] = tend;
    Ok(grid)
}
