use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::simulator::{T, V};

/// Continuous extension over one accepted step
///
/// `y(t_start + θh) = y_start + h Σ_j q[:, j] θ^(j+1)` for `θ ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct Segment {
    pub(crate) t_start: T,
    pub(crate) t_end: T,
    pub(crate) y_start: V,
    pub(crate) q: DMatrix<T>,
}

impl Segment {
    pub fn t_start(&self) -> T {
        self.t_start
    }

    pub fn t_end(&self) -> T {
        self.t_end
    }

    pub fn eval(&self, t: T) -> V {
        let h = self.t_end - self.t_start;
        let theta = (t - self.t_start) / h;
        let mut y = self.y_start.clone();
        let mut power = theta;
        for column in self.q.column_iter() {
            y.axpy(h * power, &column, 1.0);
            power *= theta;
        }
        y
    }
}

/// Piecewise polynomial solution over `[t0, t_final]`
#[derive(Debug, Clone)]
pub struct DenseSolution {
    t0: T,
    y0: V,
    segments: Vec<Segment>,
    y_final: V,
}

impl DenseSolution {
    pub(crate) fn new(t0: T, y0: V) -> Self {
        Self {
            t0,
            y_final: y0.clone(),
            y0,
            segments: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, segment: Segment, y_end: &V) {
        self.y_final.copy_from(y_end);
        self.segments.push(segment);
    }

    pub fn t0(&self) -> T {
        self.t0
    }

    pub fn t_final(&self) -> T {
        self.segments.last().map_or(self.t0, |s| s.t_end)
    }

    pub fn y_final(&self) -> &V {
        &self.y_final
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of accepted steps
    pub fn nsteps(&self) -> usize {
        self.segments.len()
    }

    /// State at `t`. The endpoints return the stored states exactly; times
    /// outside the span are extrapolated from the nearest segment.
    pub fn eval(&self, t: T) -> V {
        if t == self.t0 || self.segments.is_empty() {
            return self.y0.clone();
        }
        if t == self.t_final() {
            return self.y_final.clone();
        }
        let i = self
            .segments
            .partition_point(|s| s.t_end < t)
            .min(self.segments.len() - 1);
        self.segments[i].eval(t)
    }

    /// Sample the solution at each time in `times`, returning an
    /// `(ndim, times.len())` array.
    pub fn sample(&self, times: &Array1<T>) -> Array2<T> {
        let mut out = Array2::zeros((self.y0.len(), times.len()));
        for (mut column, &t) in out.columns_mut().into_iter().zip(times.iter()) {
            let y = self.eval(t);
            for (slot, value) in column.iter_mut().zip(y.iter()) {
                *slot = *value;
            }
        }
        out
    }
}
