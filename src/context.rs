//! Per-scan state passed explicitly through every stage.

use crate::config::ScanConfig;
use crate::operation_id::OperationIdRegistry;
use log::warn;
use std::fmt;

/// Category of a non-fatal finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A bean parameter type reappeared on its own expansion path
    BeanCycle,
    /// One member carried several incompatible location annotations
    LocationConflict,
    /// An operation was dropped because its identifier was already taken
    DuplicateOperation,
}

/// A non-fatal finding attached to the symbol that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The offending parameter or operation
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.kind, self.subject, self.message)
    }
}

/// Explicit scan context: configuration, the operation identifier registry and diagnostics
#[derive(Debug)]
pub struct ScanContext {
    config: ScanConfig,
    pub operation_ids: OperationIdRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl ScanContext {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            operation_ids: OperationIdRegistry::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Record a diagnostic and log it
    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
