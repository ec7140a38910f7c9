//! The conversion command.
//!
//! Loads configuration, applies command-line overrides, runs the converter,
//! and prints the end-of-run report to stdout.

use crate::cli::Cli;
use crate::formatters;
use anyhow::{Context, Result};
use spring_mcp_codegen::Converter;
use spring_mcp_core::ConverterConfig;
use spring_mcp_core::cli::ExitCode;
use tracing::info;

/// Builds the run configuration.
///
/// An explicit `--config` file wins over `spring-mcp.toml` in the project
/// root; flags override whatever the file sets.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or parsed.
pub fn load_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut config = match &cli.config {
        Some(path) => ConverterConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConverterConfig::discover(&cli.project)?,
    };

    if let Some(output) = &cli.output {
        config.generator.output.clone_from(output);
    }
    if let Some(name) = &cli.name {
        config.generator.name.clone_from(name);
    }
    if let Some(url) = &cli.upstream_url {
        config.generator.upstream_url.clone_from(url);
    }
    if let Some(port) = cli.port {
        config.generator.port = port;
    }
    for dir in &cli.exclude {
        if !config.scan.exclude_dirs.contains(dir) {
            config.scan.exclude_dirs.push(dir.clone());
        }
    }
    if cli.sequential {
        config.scan.parallel = false;
    }
    Ok(config)
}

/// Runs the conversion and prints the report.
///
/// Warnings never change the exit code; only fatal errors do, and those are
/// returned to the caller.
///
/// # Errors
///
/// Returns the fatal error that stopped the run.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    info!(
        "Converting {} into {}",
        cli.project.display(),
        config.generator.output.display()
    );

    let converter = Converter::new(config)?;
    let report = converter.convert(&cli.project)?;

    println!("{}", formatters::format_report(&report, cli.format, cli.debug)?);
    Ok(ExitCode::SUCCESS)
}
