//! Project Generator: renders and writes the runtime scaffold.
//!
//! A generated project holds four files:
//!
//! - `mcp_schema.json`: the tool catalog
//! - `forwarding.json`: the forwarding table
//! - `server.ts`: proxy runtime that serves the catalog and forwards calls
//! - `package.json`: runtime dependencies
//!
//! Files are written atomically: each one goes to a `.tmp` sibling first and
//! is renamed into place after it is flushed.

use crate::emitter::{ForwardingSpec, SchemaDocument, to_json_pretty};
use crate::template_engine::TemplateEngine;
use crate::types::{GeneratedCode, GeneratedFile};
use serde::Serialize;
use spring_mcp_core::{Error, GeneratorConfig, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Tool catalog file name.
pub const SCHEMA_FILE: &str = "mcp_schema.json";
/// Forwarding table file name.
pub const FORWARDING_FILE: &str = "forwarding.json";
/// Runtime entry point file name.
pub const SERVER_FILE: &str = "server.ts";
/// Runtime manifest file name.
pub const PACKAGE_FILE: &str = "package.json";

/// Context shared by the runtime templates.
#[derive(Debug, Serialize)]
struct RuntimeContext {
    name: String,
    name_json: String,
    package_name: String,
    upstream_url_json: String,
    port: u16,
    tool_count: usize,
}

/// Renders wire documents and runtime templates into a project.
#[derive(Debug)]
pub struct ProjectGenerator {
    engine: TemplateEngine<'static>,
    config: GeneratorConfig,
}

impl ProjectGenerator {
    /// Creates a generator for the given settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateError` if a built-in template does not parse.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            config: config.clone(),
        })
    }

    /// Renders every project file in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or template rendering fails.
    pub fn generate(
        &self,
        document: &SchemaDocument,
        forwarding: &ForwardingSpec,
    ) -> Result<GeneratedCode> {
        let context = RuntimeContext {
            name: self.config.name.clone(),
            name_json: serde_json::to_string(&self.config.name)?,
            package_name: package_name(&self.config.name),
            upstream_url_json: serde_json::to_string(&self.config.upstream_url)?,
            port: self.config.port,
            tool_count: document.tools.len(),
        };

        let mut code = GeneratedCode::new();
        code.add_file(GeneratedFile::new(SCHEMA_FILE, to_json_pretty(document)?));
        code.add_file(GeneratedFile::new(FORWARDING_FILE, to_json_pretty(forwarding)?));
        code.add_file(GeneratedFile::new(
            SERVER_FILE,
            self.engine.render("runtime/server", &context)?,
        ));
        code.add_file(GeneratedFile::new(
            PACKAGE_FILE,
            self.engine.render("runtime/package", &context)?,
        ));

        tracing::debug!(files = code.file_count(), name = %self.config.name, "rendered project");
        Ok(code)
    }

    /// Writes generated files below `dir`, creating it if needed.
    ///
    /// Returns the written paths in write order.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutputUnwritable` if a directory or file cannot be
    /// written, and `Error::InvalidArgument` for a path escaping `dir`.
    pub fn write(&self, code: &GeneratedCode, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| Error::OutputUnwritable {
            path: dir.display().to_string(),
            source,
        })?;

        let mut written = Vec::with_capacity(code.file_count());
        for file in code.files() {
            let relative = Path::new(&file.path);
            if relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
            {
                return Err(Error::InvalidArgument(format!(
                    "generated path escapes the output directory: {}",
                    file.path
                )));
            }
            let target = dir.join(relative);
            write_atomic(&target, &file.content)?;
            tracing::debug!(path = %target.display(), bytes = file.content.len(), "wrote file");
            written.push(target);
        }
        Ok(written)
    }
}

fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let unwritable = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| Error::OutputUnwritable { path, source }
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(unwritable(parent))?;
    }

    let mut temp = target.as_os_str().to_os_string();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let mut file = fs::File::create(&temp).map_err(unwritable(&temp))?;
    file.write_all(content.as_bytes()).map_err(unwritable(&temp))?;
    file.sync_all().map_err(unwritable(&temp))?;
    drop(file);

    fs::rename(&temp, target).map_err(unwritable(target))
}

/// npm package name for a server name: lowercase, `-`-separated.
fn package_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "spring-mcp-server".to_string()
    } else {
        format!("{trimmed}-mcp")
    }
}
