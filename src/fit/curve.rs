//! Control points → noisy, range-scaled curve.
//!
//! Steps:
//!
//! 1. sort control points ascending (they carry no x-coordinate of their own)
//! 2. place them at equally spaced positions over `[0, 1]`
//! 3. interpolate with a quadratic spline and sample `n` points over `[0, 1]`
//! 4. add Gaussian noise
//! 5. min-max normalize using the observed extremes, then map into the target range
//!
//! Noise goes in before normalization, so the output always spans the target
//! range exactly, noise or not.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::Boundary;
use crate::error::{GenError, GenResult};
use crate::math::{QuadraticSpline, linspace, min_max};

/// Noise sigma used when a configuration does not set one.
pub const DEFAULT_NOISE_SIGMA: f64 = 0.05;

/// Generate one series from control points.
pub fn fit_curve<R: Rng + ?Sized>(
    control_points: &[f64],
    range: Boundary,
    n_samples: usize,
    noise_sigma: f64,
    rng: &mut R,
) -> GenResult<Vec<f64>> {
    if n_samples == 0 {
        return Err(GenError::config("number of samples must be at least 1"));
    }
    range.validate()?;

    let spline = spline_through(control_points)?;
    let mut ys = spline.sample(0.0, 1.0, n_samples);
    add_noise(&mut ys, noise_sigma, rng)?;
    rescale_into(&mut ys, range)?;
    Ok(ys)
}

/// Sort the control points and interpolate them at their implicit positions.
pub fn spline_through(control_points: &[f64]) -> GenResult<QuadraticSpline> {
    if control_points.len() < 3 {
        return Err(GenError::config(format!(
            "at least 3 control points are required, got {}",
            control_points.len()
        )));
    }
    if control_points.iter().any(|v| !v.is_finite()) {
        return Err(GenError::config("control points must be finite"));
    }

    let ys = sorted_control_points(control_points);
    let xs = control_positions(ys.len());
    QuadraticSpline::interpolate(&xs, &ys)
}

pub fn sorted_control_points(control_points: &[f64]) -> Vec<f64> {
    let mut ys = control_points.to_vec();
    ys.sort_by(f64::total_cmp);
    ys
}

/// Implicit x-positions of `n` control points: `i / (n - 1)`.
pub fn control_positions(n: usize) -> Vec<f64> {
    linspace(0.0, 1.0, n)
}

/// Add i.i.d. `N(0, sigma)` noise in place.
pub fn add_noise<R: Rng + ?Sized>(values: &mut [f64], sigma: f64, rng: &mut R) -> GenResult<()> {
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(GenError::config(format!(
            "noise sigma must be finite and >= 0, got {sigma}"
        )));
    }
    if sigma == 0.0 {
        return Ok(());
    }
    let normal = Normal::new(0.0, sigma)
        .map_err(|e| GenError::computation(format!("noise distribution error: {e}")))?;
    for v in values.iter_mut() {
        *v += normal.sample(rng);
    }
    Ok(())
}

/// Min-max normalize with the observed extremes, then map onto `range`.
pub fn rescale_into(values: &mut [f64], range: Boundary) -> GenResult<()> {
    let Some((lo, hi)) = min_max(values) else {
        return Err(GenError::computation("cannot normalize an empty series"));
    };
    let spread = hi - lo;
    // Spline evaluation of a flat curve can wobble by a few ulps; that is still zero range.
    let floor = lo.abs().max(hi.abs()) * 64.0 * f64::EPSILON;
    if !(spread.is_finite() && spread > floor) {
        return Err(GenError::computation(format!(
            "cannot normalize a series with zero range (all samples equal {lo})"
        )));
    }

    let span = range.span();
    for v in values.iter_mut() {
        let unit = (*v - lo) / spread;
        *v = unit * span + range.min;
    }
    Ok(())
}

/// Noise-free spline evaluated on a grid, next to the control points it was built from.
#[derive(Debug, Clone)]
pub struct CurvePreview {
    /// Control points at their implicit positions, after sorting.
    pub points: Vec<(f64, f64)>,
    /// Spline samples over `[0, 1]`.
    pub curve: Vec<(f64, f64)>,
}

pub fn preview_curve(control_points: &[f64], n_samples: usize) -> GenResult<CurvePreview> {
    let spline = spline_through(control_points)?;
    let ys = sorted_control_points(control_points);
    let points = control_positions(ys.len()).into_iter().zip(ys).collect();
    let curve = linspace(0.0, 1.0, n_samples.max(2))
        .into_iter()
        .map(|x| (x, spline.eval(x)))
        .collect();
    Ok(CurvePreview { points, curve })
}
