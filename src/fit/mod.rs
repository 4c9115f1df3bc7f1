//! Curve fitting: control points to a sampled, noisy, range-scaled series.

pub mod curve;

pub use curve::*;
