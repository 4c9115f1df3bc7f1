//! Shared generation pipeline used by the CLI commands.
//!
//! config file -> validated configuration -> graph run -> summaries
//!
//! The command handlers then focus on presentation (printing, exports).

use std::path::Path;

use tracing::info;

use crate::domain::Configuration;
use crate::error::AppError;
use crate::graph::{GraphRun, RunOptions};
use crate::report::SubNodeSummary;

/// All computed outputs of a single `gsgen generate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: Configuration,
    pub run: GraphRun,
    pub summary: Vec<SubNodeSummary>,
    pub options: RunOptions,
    /// Noise sigma actually used.
    pub noise: f64,
}

/// Load a configuration file and generate every series in it.
pub fn run_generate(path: &Path, options: RunOptions) -> Result<RunOutput, AppError> {
    let config = crate::io::load_configuration(path)?;
    run_generate_with_config(config, options)
}

/// Generate from an already loaded configuration.
pub fn run_generate_with_config(config: Configuration, options: RunOptions) -> Result<RunOutput, AppError> {
    let noise = options.noise.unwrap_or(config.noise);
    info!(
        supernodes = config.supernodes.len(),
        n_cycles = config.n_cycles,
        seed = options.seed,
        noise,
        "starting generation"
    );

    let run = crate::graph::run(&config, options)?;
    let summary = crate::report::summarize(&config, &run);

    Ok(RunOutput {
        config,
        run,
        summary,
        options,
        noise,
    })
}
