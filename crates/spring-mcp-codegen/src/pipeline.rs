//! The conversion run: locate, parse, resolve, assemble, emit, write.

use crate::assembler::{Endpoint, EndpointAssembler};
use crate::context::ScanContext;
use crate::emitter::{ForwardingSpec, SchemaDocument, SchemaEmitter};
use crate::generator::ProjectGenerator;
use crate::index::ModelIndex;
use serde::Serialize;
use spring_mcp_core::{ConverterConfig, Diagnostics, Result, Warning, WarningSummary};
use spring_mcp_scanner::{SourceLocator, parse_units};
use std::path::Path;

/// Everything a scan produced, before anything is written.
#[derive(Debug)]
pub struct ScanOutput {
    /// Tool catalog
    pub document: SchemaDocument,
    /// Forwarding table
    pub forwarding: ForwardingSpec,
    /// Assembled endpoints in tool order
    pub endpoints: Vec<Endpoint>,
    /// Package of the `@SpringBootApplication` class, if found
    pub base_package: Option<String>,
    /// Warnings of the whole run, in the order they were raised
    pub diagnostics: Diagnostics,
    /// Number of source files parsed
    pub files_scanned: usize,
    /// Number of models in the catalog
    pub model_count: usize,
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Project root
    pub project: String,
    /// Output directory
    pub output: String,
    /// Number of source files parsed
    pub files_scanned: usize,
    /// Number of tools generated
    pub endpoint_count: usize,
    /// Number of models in the catalog
    pub model_count: usize,
    /// Package of the `@SpringBootApplication` class, if found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_package: Option<String>,
    /// Tool names in catalog order
    pub tools: Vec<String>,
    /// Written files
    pub files_written: Vec<String>,
    /// Per-kind warning counts
    pub summary: WarningSummary,
    /// Every warning, in the order raised
    pub warnings: Vec<Warning>,
}

/// Runs conversions with one configuration.
///
/// # Examples
///
/// ```no_run
/// use spring_mcp_codegen::Converter;
/// use spring_mcp_core::ConverterConfig;
/// use std::path::Path;
///
/// # fn example() -> spring_mcp_core::Result<()> {
/// let converter = Converter::new(ConverterConfig::default())?;
/// let report = converter.convert(Path::new("./petclinic"))?;
/// println!("{} tools, {} warnings", report.endpoint_count, report.summary.total());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Creates a converter after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is invalid.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Scans a project and builds the wire documents in memory.
    ///
    /// # Errors
    ///
    /// Returns a fatal input error if the project root is missing or
    /// unreadable, or holds no source files. Problems inside individual files
    /// only produce warnings.
    pub fn scan(&self, project: &Path) -> Result<ScanOutput> {
        tracing::info!("Scanning project: {}", project.display());

        let mut diagnostics = Diagnostics::new();
        let locator = SourceLocator::new(project, self.config.scan.clone())?;
        let mut units = locator.collect_units(&mut diagnostics)?;
        units.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        let files_scanned = units.len();

        let parsed = parse_units(&units, self.config.scan.parallel);
        let mut facts = Vec::new();
        let mut decls = Vec::new();
        let mut base_package: Option<String> = None;
        for unit in parsed {
            diagnostics.extend(unit.warnings);
            if base_package.is_none() {
                base_package = unit.application_package;
            }
            facts.extend(unit.routes);
            decls.extend(unit.models);
        }
        tracing::info!(
            "Parsed {} files: {} routes, {} model declarations",
            files_scanned,
            facts.len(),
            decls.len()
        );
        if let Some(package) = &base_package {
            tracing::info!("Application package: {package}");
        }

        let index = ModelIndex::build(decls, &mut diagnostics);
        let mut context = ScanContext::with_diagnostics(diagnostics);
        let endpoints = EndpointAssembler::new(&index).assemble(&facts, &mut context);
        tracing::info!(
            "Assembled {} endpoints, resolved {} models",
            endpoints.len(),
            context.registry.len()
        );

        let emitter = SchemaEmitter::new(self.config.generator.name.clone(), base_package.clone());
        let document = emitter.document(&endpoints, &context.registry);
        let forwarding = emitter.forwarding(&endpoints);
        let model_count = document.models.len();
        tracing::info!(
            "Emitted {} tools and {} models",
            document.tools.len(),
            model_count
        );

        Ok(ScanOutput {
            document,
            forwarding,
            endpoints,
            base_package,
            diagnostics: context.diagnostics,
            files_scanned,
            model_count,
        })
    }

    /// Scans a project and writes the generated project to the configured
    /// output directory.
    ///
    /// # Errors
    ///
    /// Returns a fatal input error (see [`Converter::scan`]), a template
    /// error, or `Error::OutputUnwritable`.
    pub fn convert(&self, project: &Path) -> Result<ConversionReport> {
        let output = self.scan(project)?;
        let generator = ProjectGenerator::new(&self.config.generator)?;
        let code = generator.generate(&output.document, &output.forwarding)?;
        let out_dir = &self.config.generator.output;
        let written = generator.write(&code, out_dir)?;
        tracing::info!("Wrote {} files to {}", written.len(), out_dir.display());

        let summary = output.diagnostics.summary();
        if summary.total() > 0 {
            tracing::info!("Finished with {} warning(s)", summary.total());
        }

        Ok(ConversionReport {
            project: project.display().to_string(),
            output: out_dir.display().to_string(),
            files_scanned: output.files_scanned,
            endpoint_count: output.endpoints.len(),
            model_count: output.model_count,
            base_package: output.base_package,
            tools: output
                .document
                .tools
                .iter()
                .map(|tool| tool.name.as_str().to_string())
                .collect(),
            files_written: written.iter().map(|p| p.display().to_string()).collect(),
            summary,
            warnings: output.diagnostics.into_warnings(),
        })
    }
}
