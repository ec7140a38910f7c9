//! Spring MCP command-line converter.
//!
//! # Examples
//!
//! ```bash
//! # Convert a project with defaults
//! spring-mcp --project ./petclinic
//!
//! # Custom output, name, and a machine-readable report
//! spring-mcp -p ./petclinic -o ./petclinic-mcp --name PetClinic --format json
//! ```

use clap::Parser;
use colored::Colorize;
use spring_mcp_cli::{Cli, commands, exit_code_for, logging};
use spring_mcp_core::cli::ExitCode;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging(cli.debug, cli.log_format) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(ExitCode::ERROR.as_i32());
    }

    let exit_code = match commands::convert::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("{} {err:#}", "error:".red().bold());
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code.as_i32());
}
