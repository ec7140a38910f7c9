//! Spring MCP CLI library.
//!
//! Argument parsing, the conversion command, logging setup, and report
//! formatters, exposed so they can be tested without spawning the binary.

use spring_mcp_core::cli::ExitCode;

pub mod cli;
pub mod commands;
pub mod formatters;
pub mod logging;

pub use cli::Cli;

/// Maps a failed run onto its process exit code.
///
/// Errors raised by the converter keep their category; anything else is a
/// generic failure.
#[must_use]
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    error
        .downcast_ref::<spring_mcp_core::Error>()
        .map_or(ExitCode::ERROR, ExitCode::for_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_converter_errors() {
        let fatal = anyhow::Error::new(spring_mcp_core::Error::ProjectNotFound {
            path: "/missing".to_string(),
        });
        assert_eq!(exit_code_for(&fatal), ExitCode::FATAL_INPUT);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&other), ExitCode::ERROR);
    }
}
