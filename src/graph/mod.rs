//! Graph-based series generation.
//!
//! - `independent`: base curves only
//! - `dependent`: base curves plus weighted/correlated inputs
//! - `orchestrator`: dependency-tier ordering and the run loop
//! - `expectations`: advisory checks on input contributions

pub mod dependent;
pub mod expectations;
pub mod independent;
pub mod orchestrator;

pub use dependent::*;
pub use expectations::*;
pub use independent::*;
pub use orchestrator::*;
