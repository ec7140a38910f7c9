//! CLI-specific types shared by the binary and its tests.
//!
//! # Examples
//!
//! ```
//! use spring_mcp_core::cli::{ExitCode, LogFormat, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//!
//! assert_eq!(ExitCode::FATAL_INPUT.as_i32(), 2);
//! assert_eq!(LogFormat::default(), LogFormat::Text);
//! ```

use std::fmt;
use std::str::FromStr;

/// Format of the end-of-run report.
///
/// # Examples
///
/// ```
/// use spring_mcp_core::cli::OutputFormat;
///
/// let format: OutputFormat = "pretty".parse().unwrap();
/// assert_eq!(format.as_str(), "pretty");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JSON report for machine parsing
    Json,
    /// Plain text for scripts
    Text,
    /// Colored output for humans
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(crate::Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// Format of log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Returns the string representation of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(crate::Error::InvalidArgument(format!(
                "invalid log format: '{s}' (expected: text or json)"
            ))),
        }
    }
}

/// Process exit code.
///
/// # Examples
///
/// ```
/// use spring_mcp_core::cli::ExitCode;
///
/// assert!(ExitCode::SUCCESS.is_success());
/// assert_eq!(ExitCode::OUTPUT_ERROR.as_i32(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Conversion finished (possibly with warnings).
    pub const SUCCESS: Self = Self(0);

    /// Unexpected or configuration error.
    pub const ERROR: Self = Self(1);

    /// Project root missing or unreadable, or no source files found.
    pub const FATAL_INPUT: Self = Self(2);

    /// Generated project could not be written.
    pub const OUTPUT_ERROR: Self = Self(3);

    /// Creates an exit code from a raw value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Returns `true` for `SUCCESS`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Maps a fatal error onto its exit code.
    #[must_use]
    pub const fn for_error(error: &crate::Error) -> Self {
        if error.is_fatal_input() {
            Self::FATAL_INPUT
        } else if error.is_output_error() {
            Self::OUTPUT_ERROR
        } else {
            Self::ERROR
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Pretty);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Text.to_string(), "text");
    }

    #[test]
    fn test_exit_code_for_error() {
        let fatal = Error::NoSourceFiles {
            path: "/p".to_string(),
        };
        assert_eq!(ExitCode::for_error(&fatal), ExitCode::FATAL_INPUT);

        let output = Error::OutputUnwritable {
            path: "/o".to_string(),
            source: io::Error::other("disk full"),
        };
        assert_eq!(ExitCode::for_error(&output), ExitCode::OUTPUT_ERROR);

        let config = Error::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(ExitCode::for_error(&config), ExitCode::ERROR);
    }

    #[test]
    fn test_exit_code_conversions() {
        assert_eq!(i32::from(ExitCode::OUTPUT_ERROR), 3);
        assert_eq!(ExitCode::from_i32(2), ExitCode::FATAL_INPUT);
        assert_eq!(ExitCode::default(), ExitCode::SUCCESS);
        assert_eq!(ExitCode::ERROR.to_string(), "1");
    }
}
