//! Input/output helpers.
//!
//! - configuration loading + validation (`config`)
//! - per-sub-node CSV exports (`export`)
//! - store JSON read/write (`store`)

pub mod config;
pub mod export;
pub mod store;

pub use config::*;
pub use export::*;
pub use store::*;
