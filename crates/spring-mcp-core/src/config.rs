//! Configuration for a conversion run.
//!
//! Loaded from `spring-mcp.toml` in the project root (or an explicit path)
//! and overridden by command-line flags.
//!
//! ```toml
//! [scan]
//! extensions = ["java"]
//! source_roots = ["src/main/java"]
//! exclude_dirs = ["target", "build", "test"]
//! max_file_size = 1048576
//! follow_symlinks = true
//! parallel = true
//!
//! [generator]
//! name = "SpringAPI"
//! output = "./mcp_server"
//! upstream_url = "http://localhost:8080"
//! port = 8000
//! ```
//!
//! # Examples
//!
//! ```
//! use spring_mcp_core::ConverterConfig;
//!
//! let config = ConverterConfig::from_toml_str("[generator]\nname = \"Petstore\"\n").unwrap();
//! assert_eq!(config.generator.name, "Petstore");
//! assert_eq!(config.scan.extensions, vec!["java".to_string()]);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the project root when no config path is given.
pub const CONFIG_FILE_NAME: &str = "spring-mcp.toml";

/// Complete configuration of a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Source discovery and parsing settings
    pub scan: ScanConfig,
    /// Generated project settings
    pub generator: GeneratorConfig,
}

/// Source discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions (without dot) considered source files.
    pub extensions: Vec<String>,
    /// Path fragments a source file must live under. When none of the files
    /// in the project matches, the whole tree is scanned instead.
    pub source_roots: Vec<String>,
    /// Directory names skipped anywhere in the tree.
    pub exclude_dirs: Vec<String>,
    /// Files larger than this are skipped with a warning.
    pub max_file_size: u64,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Parse files on a worker pool.
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["java".to_string()],
            source_roots: vec!["src/main/java".to_string()],
            exclude_dirs: [
                "target",
                "build",
                "out",
                "bin",
                ".gradle",
                ".mvn",
                ".git",
                ".idea",
                "node_modules",
                "vendor",
                "test",
                "tests",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            max_file_size: 1024 * 1024,
            follow_symlinks: true,
            parallel: true,
        }
    }
}

/// Generated project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Server name written into the schema document.
    pub name: String,
    /// Output directory.
    pub output: PathBuf,
    /// Default upstream base URL baked into the runtime scaffold.
    pub upstream_url: String,
    /// Listen port of the generated runtime.
    pub port: u16,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            name: "SpringAPI".to_string(),
            output: PathBuf::from("./mcp_server"),
            upstream_url: "http://localhost:8080".to_string(),
            port: 8000,
        }
    }
}

impl ConverterConfig {
    /// Parses a configuration from TOML text.
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the text is not valid TOML, does not
    /// match the schema, or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigError {
            message: format!("failed to parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `spring-mcp.toml` from the project root if present, otherwise
    /// returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the file exists but is invalid.
    pub fn discover(project_root: &Path) -> Result<Self> {
        let candidate = project_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError {
            message: format!("failed to serialize config: {e}"),
        })
    }

    /// Validates field values.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(Error::ConfigError {
                message: "scan.extensions must list at least one extension".to_string(),
            });
        }
        if self.generator.name.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "generator.name cannot be empty".to_string(),
            });
        }
        if self.generator.port == 0 {
            return Err(Error::ConfigError {
                message: "generator.port must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.generator.name, "SpringAPI");
        assert_eq!(config.generator.output, PathBuf::from("./mcp_server"));
        assert_eq!(config.generator.port, 8000);
        assert!(config.scan.exclude_dirs.contains(&"target".to_string()));
        assert!(config.scan.exclude_dirs.contains(&"test".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConverterConfig::from_toml_str(
            r#"
            [scan]
            exclude_dirs = ["legacy"]
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.exclude_dirs, vec!["legacy".to_string()]);
        assert!(!config.scan.parallel);
        assert_eq!(config.scan.source_roots, vec!["src/main/java".to_string()]);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ConverterConfig::from_toml_str("[scan\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let err = ConverterConfig::from_toml_str("[generator]\nport = 0\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validation_rejects_empty_extensions() {
        let err = ConverterConfig::from_toml_str("[scan]\nextensions = []\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_discover_reads_project_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[generator]\nname = \"Orders\"\n",
        )
        .unwrap();

        let config = ConverterConfig::discover(temp.path()).unwrap();
        assert_eq!(config.generator.name, "Orders");
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConverterConfig::discover(temp.path()).unwrap();
        assert_eq!(config, ConverterConfig::default());
    }

    #[test]
    fn test_toml_roundtrip_preserves_values() {
        let mut config = ConverterConfig::default();
        config.generator.name = "Inventory".to_string();
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[generator]"));
        assert_eq!(ConverterConfig::from_toml_str(&text).unwrap(), config);
    }
}
