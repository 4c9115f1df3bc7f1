//! Quadratic interpolating B-spline.
//!
//! Given strictly increasing `x_0 < … < x_{n-1}` and values `y_i`, we build a
//! degree-2 spline `s(x) = Σ c_j B_j(x)` with `s(x_i) = y_i`.
//!
//! Knot layout (n + 3 knots):
//!
//! ```text
//! x_0, x_0, x_0, m_1, …, m_{n-3}, x_{n-1}, x_{n-1}, x_{n-1}
//! ```
//!
//! where `m_j = (x_j + x_{j+1}) / 2`. The first and last midpoints are left out,
//! which is the not-a-knot analogue for even degree. With exactly three points
//! there are no interior knots and the spline is the interpolating parabola.
//!
//! The coefficients come from the square collocation system `B c = y`, solved
//! with an LU decomposition.

use nalgebra::{DMatrix, DVector};

use crate::error::{GenError, GenResult};

const DEGREE: usize = 2;

/// Degree-2 spline through a set of points.
#[derive(Debug, Clone)]
pub struct QuadraticSpline {
    knots: Vec<f64>,
    coeffs: Vec<f64>,
}

impl QuadraticSpline {
    /// Interpolate `(xs[i], ys[i])`.
    pub fn interpolate(xs: &[f64], ys: &[f64]) -> GenResult<Self> {
        if xs.len() != ys.len() {
            return Err(GenError::computation(format!(
                "spline input length mismatch: {} x-values, {} y-values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < DEGREE + 1 {
            return Err(GenError::config(format!(
                "quadratic interpolation needs at least {} points, got {}",
                DEGREE + 1,
                xs.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(GenError::computation("spline inputs must be finite"));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GenError::computation(
                "spline x-positions must be strictly increasing",
            ));
        }

        let n = xs.len();
        let knots = quadratic_knots(xs);

        let mut design = DMatrix::<f64>::zeros(n, n);
        for (row, &x) in xs.iter().enumerate() {
            let span = find_span(&knots, n, x);
            let basis = basis_functions(&knots, span, x);
            for (j, &b) in basis.iter().enumerate() {
                design[(row, span - DEGREE + j)] = b;
            }
        }

        let rhs = DVector::from_column_slice(ys);
        let coeffs = design
            .lu()
            .solve(&rhs)
            .ok_or_else(|| GenError::computation("spline collocation system is singular"))?;
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(GenError::computation(
                "spline collocation produced non-finite coefficients",
            ));
        }

        Ok(Self {
            knots,
            coeffs: coeffs.iter().copied().collect(),
        })
    }

    /// Evaluate at `x`. Values outside the data range are extrapolated from the end pieces.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.coeffs.len();
        let span = find_span(&self.knots, n, x);
        let basis = basis_functions(&self.knots, span, x);
        basis
            .iter()
            .enumerate()
            .map(|(j, b)| b * self.coeffs[span - DEGREE + j])
            .sum()
    }

    /// Evaluate at `n` equally spaced positions over `[lo, hi]`, both ends included.
    ///
    /// `n == 1` evaluates at `lo` only.
    pub fn sample(&self, lo: f64, hi: f64, n: usize) -> Vec<f64> {
        linspace(lo, hi, n).into_iter().map(|x| self.eval(x)).collect()
    }
}

/// `n` equally spaced values over `[lo, hi]`, both ends included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

fn quadratic_knots(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut knots = Vec::with_capacity(n + DEGREE + 1);
    knots.extend([xs[0]; DEGREE + 1]);
    for j in 1..n - 2 {
        knots.push(0.5 * (xs[j] + xs[j + 1]));
    }
    knots.extend([xs[n - 1]; DEGREE + 1]);
    knots
}

/// Index `l` in `[DEGREE, n - 1]` with `knots[l] <= x < knots[l + 1]`.
///
/// The right end of the domain belongs to the last non-empty span.
fn find_span(knots: &[f64], n: usize, x: f64) -> usize {
    if x >= knots[n] {
        return n - 1;
    }
    (DEGREE..n).rev().find(|&i| knots[i] <= x).unwrap_or(DEGREE)
}

/// The `DEGREE + 1` non-zero B-spline basis values at `x` (Cox–de Boor, triangular form).
fn basis_functions(knots: &[f64], span: usize, x: f64) -> [f64; DEGREE + 1] {
    let mut values = [0.0; DEGREE + 1];
    let mut left = [0.0; DEGREE + 1];
    let mut right = [0.0; DEGREE + 1];
    values[0] = 1.0;

    for j in 1..=DEGREE {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            // 0/0 convention for repeated knots.
            let temp = if denom == 0.0 { 0.0 } else { values[r] / denom };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }

    values
}
