//! Output formatters for the end-of-run report.
//!
//! JSON for machines, plain text for scripts, colored text for terminals.

use anyhow::Result;
use colored::Colorize;
use spring_mcp_codegen::ConversionReport;
use spring_mcp_core::cli::OutputFormat;

/// Formats a report.
///
/// With `verbose`, the text formats list every warning; JSON always
/// includes them.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &ConversionReport, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(report),
        OutputFormat::Text => Ok(text::format(report, verbose)),
        OutputFormat::Pretty => Ok(pretty::format(report, verbose)),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{ConversionReport, Result};

    /// Pretty-printed JSON with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format(report: &ConversionReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::ConversionReport;
    use std::fmt::Write;

    /// One `key: value` line per fact.
    #[must_use]
    pub fn format(report: &ConversionReport, verbose: bool) -> String {
        let summary = &report.summary;
        let mut out = String::new();
        let _ = writeln!(out, "project: {}", report.project);
        let _ = writeln!(out, "output: {}", report.output);
        if let Some(package) = &report.base_package {
            let _ = writeln!(out, "base package: {package}");
        }
        let _ = writeln!(out, "files scanned: {}", report.files_scanned);
        let _ = writeln!(out, "tools: {}", report.endpoint_count);
        let _ = writeln!(out, "models: {}", report.model_count);
        let _ = write!(
            out,
            "warnings: {} (skipped-file {}, degraded-extraction {}, name-collision {}, structural-inconsistency {})",
            summary.total(),
            summary.skipped_file,
            summary.degraded_extraction,
            summary.name_collision,
            summary.structural_inconsistency
        );
        if verbose {
            for warning in &report.warnings {
                let _ = write!(out, "\n  {warning}");
            }
        }
        out
    }
}

/// Colored output for terminals.
pub mod pretty {
    use super::{ConversionReport, Colorize};
    use std::fmt::Write;

    /// Summary with a tool list and, when `verbose`, every warning.
    #[must_use]
    pub fn format(report: &ConversionReport, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {} tools from {}",
            "✓ Generated".green().bold(),
            report.endpoint_count.to_string().cyan(),
            report.project.bold()
        );
        let _ = writeln!(out, "  {} {}", "Output:".bold(), report.output);
        if let Some(package) = &report.base_package {
            let _ = writeln!(out, "  {} {package}", "Package:".bold());
        }
        let _ = writeln!(
            out,
            "  {} {} files scanned, {} models",
            "Scan:".bold(),
            report.files_scanned.to_string().cyan(),
            report.model_count.to_string().cyan()
        );

        if !report.tools.is_empty() {
            let _ = writeln!(out, "\n{}", "Tools:".bold());
            for tool in &report.tools {
                let _ = writeln!(out, "  • {}", tool.green());
            }
        }

        let summary = &report.summary;
        if summary.total() == 0 {
            let _ = write!(out, "\n{}", "No warnings".green());
            return out;
        }
        let _ = write!(
            out,
            "\n{} {} skipped, {} degraded, {} renamed, {} inconsistent",
            format!("{} warning(s):", summary.total()).yellow().bold(),
            summary.skipped_file,
            summary.degraded_extraction,
            summary.name_collision,
            summary.structural_inconsistency
        );
        if verbose {
            for warning in &report.warnings {
                let location = warning.location.as_deref().unwrap_or("-");
                let _ = write!(
                    out,
                    "\n  {} {}: {}",
                    format!("[{}]", warning.kind).yellow(),
                    location.dimmed(),
                    warning.message
                );
            }
        } else {
            let _ = write!(out, "\n  {}", "run with --debug to list them".dimmed());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spring_mcp_core::{Diagnostics, WarningKind};

    fn report() -> ConversionReport {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(
            WarningKind::NameCollision,
            Some("LegacyController#ping".to_string()),
            "tool get_ping renamed to get_ping_2",
        );
        ConversionReport {
            project: "./petstore".to_string(),
            output: "./mcp_server".to_string(),
            files_scanned: 3,
            endpoint_count: 2,
            model_count: 1,
            base_package: Some("com.petstore".to_string()),
            tools: vec!["get_ping".to_string(), "get_ping_2".to_string()],
            files_written: vec!["./mcp_server/mcp_schema.json".to_string()],
            summary: diagnostics.summary(),
            warnings: diagnostics.into_warnings(),
        }
    }

    #[test]
    fn test_json_report() {
        let output = format_report(&report(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["endpoint_count"], 2);
        assert_eq!(value["summary"]["name_collision"], 1);
        assert_eq!(value["warnings"][0]["kind"], "name_collision");
        assert_eq!(value["base_package"], "com.petstore");
    }

    #[test]
    fn test_text_report() {
        let output = format_report(&report(), OutputFormat::Text, false).unwrap();
        assert!(output.contains("tools: 2"));
        assert!(output.contains("base package: com.petstore"));
        assert!(output.contains("name-collision 1"));
        assert!(!output.contains("renamed to get_ping_2"));

        let verbose = format_report(&report(), OutputFormat::Text, true).unwrap();
        assert!(verbose.contains("[name-collision] LegacyController#ping: tool get_ping renamed to get_ping_2"));
    }

    #[test]
    fn test_pretty_report() {
        let output = format_report(&report(), OutputFormat::Pretty, false).unwrap();
        assert!(output.contains("get_ping_2"));
        assert!(output.contains("--debug"));

        let verbose = format_report(&report(), OutputFormat::Pretty, true).unwrap();
        assert!(verbose.contains("renamed to get_ping_2"));
    }

    #[test]
    fn test_pretty_report_without_warnings() {
        let mut clean = report();
        clean.warnings.clear();
        clean.summary = Diagnostics::new().summary();
        let output = pretty::format(&clean, false);
        assert!(output.contains("No warnings"));
    }
}
