//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the generation graph (`Configuration`, `SuperNodeConfig`, `InputSpec`)
//! - dependency tiers (`NodeType`, `Tier`)
//! - generated outputs (`GeneratedSeries`, `GeneratedStore`, `SubNodeFrame`)

pub mod types;

pub use types::*;
