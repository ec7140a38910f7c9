//! Command implementations for the Spring MCP CLI.

pub mod convert;
