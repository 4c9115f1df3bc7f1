//! `graph-series` library crate.
//!
//! Generates synthetic time series from a graph of super nodes: each sub node is
//! a spline through control points, rescaled into a target range, optionally
//! plus weighted/correlated copies of series generated earlier.
//!
//! The binary (`gsgen`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the generator can be embedded by other tools that supply a `Configuration`
//!   and consume the `GeneratedStore`

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod graph;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
