//! Error types for Spring to MCP conversion.
//!
//! Only conditions that abort a run are errors. Everything that degrades a
//! single file, method, or type is recorded as a [`Warning`](crate::Warning)
//! instead and the run continues.
//!
//! # Examples
//!
//! ```
//! use spring_mcp_core::{Error, Result};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "server name cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_name("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for Spring to MCP conversion.
///
/// All fatal errors in the system use this type, providing consistent error
/// handling across all crates in the workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Project root does not exist.
    #[error("project root not found: {path}")]
    ProjectNotFound {
        /// Path given as the project root
        path: String,
    },

    /// Project root exists but cannot be read.
    ///
    /// Occurs when the root is not a directory or its entries cannot be
    /// listed because of permissions.
    #[error("project root is not readable: {path}")]
    ProjectUnreadable {
        /// Path given as the project root
        path: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The walk found no analyzable source file at all.
    #[error("no analyzable source files found under {path}")]
    NoSourceFiles {
        /// Project root that was scanned
        path: String,
    },

    /// Output directory or one of the generated files cannot be written.
    #[error("cannot write output to {path}")]
    OutputUnwritable {
        /// Directory or file that failed
        path: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Configuration error.
    ///
    /// Raised when the configuration file cannot be parsed or contains
    /// invalid values.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Scaffold template registration or rendering failed.
    #[error("Template '{template}' failed: {message}")]
    TemplateError {
        /// Template name
        template: String,
        /// Description of the failure
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if the error is caused by a missing or unusable input
    /// project.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_core::Error;
    ///
    /// let err = Error::ProjectNotFound { path: "/nope".to_string() };
    /// assert!(err.is_fatal_input());
    ///
    /// let err = Error::InvalidArgument("x".to_string());
    /// assert!(!err.is_fatal_input());
    /// ```
    #[must_use]
    pub const fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. } | Self::ProjectUnreadable { .. } | Self::NoSourceFiles { .. }
        )
    }

    /// Returns `true` if writing the generated project failed.
    #[must_use]
    pub const fn is_output_error(&self) -> bool {
        matches!(self, Self::OutputUnwritable { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "port must be non-zero".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a template error.
    #[must_use]
    pub const fn is_template_error(&self) -> bool {
        matches!(self, Self::TemplateError { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::SerializationError {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
