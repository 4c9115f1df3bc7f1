//! Mathematical utilities: quadratic spline interpolation and series statistics.

pub mod spline;
pub mod stats;

pub use spline::*;
pub use stats::*;
