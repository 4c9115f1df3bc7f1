//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and validates the configuration
//! - runs the generation graph
//! - prints summaries/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ConfigArgs, GenerateArgs, PlotArgs, PreviewArgs};
use crate::error::AppError;
use crate::graph::RunOptions;

pub mod pipeline;

/// Entry point for the `gsgen` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; it only supplies RUST_LOG and friends.
    let _ = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Check(args) => handle_check(args),
        Command::Preview(args) => handle_preview(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let options = RunOptions {
        seed: args.seed,
        noise: args.noise,
    };
    let out = pipeline::run_generate(&args.config.config, options)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &out.config,
            &out.summary,
            &out.run.violations,
            out.options.seed,
            out.noise
        )
    );

    if args.plot {
        for &id in &out.run.order {
            let Some(subs) = out.run.store.super_node(id) else {
                continue;
            };
            let series: Vec<&[f64]> = subs.values().map(|s| s.values()).collect();
            let title = format!("Super node {id}");
            println!(
                "{}",
                crate::plot::render_series_chart(&title, &series, args.width, args.height)
            );
        }
    }

    // Optional exports.
    if let Some(dir) = &args.out_dir {
        let written = crate::io::write_frames_csv(dir, &out.run.frames)?;
        info!(files = written.len(), dir = %dir.display(), "wrote sub node CSVs");
    }
    if let Some(path) = &args.export_json {
        let file = crate::io::StoreFile::new(&out.config, &out.run.store, out.options.seed, out.noise);
        crate::io::write_store_json(path, &file)?;
        info!(path = %path.display(), "wrote store JSON");
    }

    Ok(())
}

fn handle_check(args: ConfigArgs) -> Result<(), AppError> {
    let config = crate::io::load_configuration(&args.config)?;
    let steps = crate::graph::plan(&config)?;
    println!("{}", crate::report::format_plan(&steps));
    Ok(())
}

fn handle_preview(args: PreviewArgs) -> Result<(), AppError> {
    let config = crate::io::load_configuration(&args.config.config)?;
    let node = config.supernodes.get(&args.node).ok_or_else(|| {
        AppError::new(2, format!("Super node {} is not in the configuration", args.node))
    })?;

    let preview = crate::fit::preview_curve(&node.control_points, args.samples)?;
    println!(
        "{}",
        crate::plot::render_curve_preview(&preview, args.width, args.height)
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_store_json(&args.store)?;
    let subs = file.series.super_node(args.node).ok_or_else(|| {
        AppError::new(2, format!("Super node {} is not in '{}'", args.node, args.store.display()))
    })?;

    let series: Vec<&[f64]> = subs.values().map(|s| s.values()).collect();
    let kind = file
        .node_types
        .get(&args.node)
        .map(|t| t.display_name())
        .unwrap_or("unknown");
    let title = format!("Super node {} ({kind})", args.node);
    println!(
        "{}",
        crate::plot::render_series_chart(&title, &series, args.width, args.height)
    );
    Ok(())
}

/// Rewrite argv so a bare config path means `generate`.
///
/// Rules:
/// - `gsgen`                      -> `gsgen --help`
/// - `gsgen graph.toml ...`       -> `gsgen generate -c graph.toml ...`
/// - subcommands and flags        -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("--help".to_string());
        return argv;
    };

    let is_subcommand = matches!(arg1.as_str(), "generate" | "check" | "preview" | "plot" | "help");
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    argv.insert(1, "-c".to_string());
    argv.insert(1, "generate".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_shows_help() {
        assert_eq!(rewrite_args(args(&["gsgen"])), args(&["gsgen", "--help"]));
    }

    #[test]
    fn bare_path_means_generate() {
        assert_eq!(
            rewrite_args(args(&["gsgen", "graph.toml", "--plot"])),
            args(&["gsgen", "generate", "-c", "graph.toml", "--plot"])
        );
    }

    #[test]
    fn subcommands_pass_through() {
        let argv = args(&["gsgen", "check", "-c", "g.json"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
        let argv = args(&["gsgen", "--version"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
    }
}
