//! Core types, diagnostics, and errors for Spring to MCP conversion.
//!
//! This crate provides the foundational types and abstractions used across
//! all other crates in the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`ToolName`, `QualifiedName`, `HttpVerb`)
//! - Error hierarchy for fatal conditions
//! - `Diagnostics`, the collector for non-fatal scan warnings
//! - Configuration types loaded from `spring-mcp.toml`

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod diagnostics;
mod error;
mod types;

pub mod cli;

pub use config::{CONFIG_FILE_NAME, ConverterConfig, GeneratorConfig, ScanConfig};
pub use diagnostics::{Diagnostics, Warning, WarningKind, WarningSummary};
pub use error::{Error, Result};
pub use types::{HttpVerb, QualifiedName, ToolName};
