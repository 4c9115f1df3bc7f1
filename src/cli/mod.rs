//! Command-line parsing for the graph series generator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the generation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SuperNodeId;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gsgen", version, about = "Graph-based synthetic time-series generator")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate every series in a configuration, print a summary, and optionally export.
    Generate(GenerateArgs),
    /// Validate a configuration and print the processing order without generating.
    Check(ConfigArgs),
    /// Preview a super node's noise-free spline against its control points.
    Preview(PreviewArgs),
    /// Chart a super node from a previously exported store JSON.
    Plot(PlotArgs),
}

/// The configuration file to read.
#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Configuration file (.json or .toml).
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,
}

/// Options for `gsgen generate`.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Random seed; each super node derives its own stream from it.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Override the configuration's noise sigma.
    #[arg(long)]
    pub noise: Option<f64>,

    /// Write one CSV per sub node into this directory.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Write the whole generated store to a JSON file.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Print one chart per super node.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `gsgen preview`.
#[derive(Debug, Args, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Super node whose control points are previewed.
    #[arg(long)]
    pub node: SuperNodeId,

    /// Number of spline samples to draw.
    #[arg(long, default_value_t = 200)]
    pub samples: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `gsgen plot`.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Store JSON produced by `gsgen generate --export-json`.
    #[arg(long, value_name = "JSON")]
    pub store: PathBuf,

    /// Super node to chart.
    #[arg(long)]
    pub node: SuperNodeId,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
