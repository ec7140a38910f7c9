//! Non-fatal scan diagnostics.
//!
//! A scan never aborts because one file, method, or type could not be
//! analyzed. Each degradation is recorded here and surfaced once, in the
//! end-of-run summary.
//!
//! # Examples
//!
//! ```
//! use spring_mcp_core::{Diagnostics, WarningKind};
//!
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.warn(
//!     WarningKind::NameCollision,
//!     Some("UserController#ping".to_string()),
//!     "tool name 'get_ping' renamed to 'get_ping_2'",
//! );
//!
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics.summary().name_collision, 1);
//! ```

use serde::Serialize;
use std::fmt;

/// Category of a recorded warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A file or directory could not be read and was skipped.
    SkippedFile,
    /// Extraction degraded: unparseable member, unresolved type, missing
    /// documentation, or an unbound parameter.
    DegradedExtraction,
    /// Two tools or two arguments wanted the same name.
    NameCollision,
    /// A type reference had the wrong number of type arguments, or a model
    /// declared the same field twice.
    StructuralInconsistency,
}

impl WarningKind {
    /// Returns a short label for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SkippedFile => "skipped-file",
            Self::DegradedExtraction => "degraded-extraction",
            Self::NameCollision => "name-collision",
            Self::StructuralInconsistency => "structural-inconsistency",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Category of the warning
    pub kind: WarningKind,
    /// Where it happened (`path:line` or `Class#method`), if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl Warning {
    /// Creates a new warning.
    #[must_use]
    pub fn new(kind: WarningKind, location: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "[{}] {location}: {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Per-kind warning counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarningSummary {
    /// Count of `SkippedFile` warnings
    pub skipped_file: usize,
    /// Count of `DegradedExtraction` warnings
    pub degraded_extraction: usize,
    /// Count of `NameCollision` warnings
    pub name_collision: usize,
    /// Count of `StructuralInconsistency` warnings
    pub structural_inconsistency: usize,
}

impl WarningSummary {
    /// Total number of warnings.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.skipped_file
            + self.degraded_extraction
            + self.name_collision
            + self.structural_inconsistency
    }
}

/// Collector for warnings produced during one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Records a warning and mirrors it to the tracing subscriber.
    pub fn warn(&mut self, kind: WarningKind, location: Option<String>, message: impl Into<String>) {
        self.push(Warning::new(kind, location, message));
    }

    /// Records an already-built warning.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(kind = %warning.kind, "{}", warning_text(&warning));
        self.warnings.push(warning);
    }

    /// Records a warning without emitting a `warn`-level event.
    ///
    /// Used for high-volume conditions such as missing Javadoc, which still
    /// count in the summary but would drown the log at `info`.
    pub fn note(&mut self, kind: WarningKind, location: Option<String>, message: impl Into<String>) {
        let warning = Warning::new(kind, location, message);
        tracing::debug!(kind = %warning.kind, "{}", warning_text(&warning));
        self.warnings.push(warning);
    }

    /// Appends warnings collected elsewhere (e.g. by a parser worker),
    /// keeping their order.
    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    /// Returns all warnings in the order they were recorded.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Returns the number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Returns warnings of one kind.
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    /// Counts warnings per kind.
    #[must_use]
    pub fn summary(&self) -> WarningSummary {
        let mut summary = WarningSummary::default();
        for warning in &self.warnings {
            match warning.kind {
                WarningKind::SkippedFile => summary.skipped_file += 1,
                WarningKind::DegradedExtraction => summary.degraded_extraction += 1,
                WarningKind::NameCollision => summary.name_collision += 1,
                WarningKind::StructuralInconsistency => summary.structural_inconsistency += 1,
            }
        }
        summary
    }

    /// Consumes the collector and returns the warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

fn warning_text(warning: &Warning) -> String {
    match &warning.location {
        Some(location) => format!("{location}: {}", warning.message),
        None => warning.message.clone(),
    }
}
