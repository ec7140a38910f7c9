//! Command-line arguments.

use clap::Parser;
use spring_mcp_core::cli::{LogFormat, OutputFormat};
use std::path::PathBuf;

/// Spring MCP - turn a Spring Boot project into an MCP server.
///
/// Scans the project's REST controllers and data classes without compiling
/// them, then writes a tool catalog, a forwarding table, and a small proxy
/// runtime that exposes every endpoint as an MCP tool.
#[derive(Parser, Debug)]
#[command(name = "spring-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Root of the Spring Boot project to scan
    #[arg(short, long, env = "SPRING_MCP_PROJECT")]
    pub project: PathBuf,

    /// Output directory for the generated server [default: ./mcp_server]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Server name written into the catalog [default: SpringAPI]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Configuration file (defaults to <project>/spring-mcp.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Upstream base URL baked into the runtime [default: http://localhost:8080]
    #[arg(long)]
    pub upstream_url: Option<String>,

    /// Listen port of the generated runtime [default: 8000]
    #[arg(long)]
    pub port: Option<u16>,

    /// Additional directory names to skip while scanning
    #[arg(long = "exclude", num_args = 1)]
    pub exclude: Vec<String>,

    /// Parse files one at a time instead of on the worker pool
    #[arg(long)]
    pub sequential: bool,

    /// Enable debug logging and list every warning in the report
    #[arg(short, long)]
    pub debug: bool,

    /// Report format (json, text, pretty)
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,
}
