//! Per-run scan state.

use crate::registry::ModelRegistry;
use spring_mcp_core::Diagnostics;

/// Mutable state of one conversion run.
///
/// Created at scan start and dropped when the run finishes; nothing outlives
/// a run.
#[derive(Debug, Default)]
pub struct ScanContext {
    /// Warnings collected so far
    pub diagnostics: Diagnostics,
    /// Models resolved so far
    pub registry: ModelRegistry,
}

impl ScanContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that continues from warnings raised earlier in the
    /// run (locating and parsing).
    #[must_use]
    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            registry: ModelRegistry::new(),
        }
    }
}
