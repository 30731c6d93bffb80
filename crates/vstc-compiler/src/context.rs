//! Diagnostics accumulated during one compilation

use vstc_core::{Diagnostic, DiagnosticCode, Location, Severity, SeverityThreshold};

/// Collects errors and warnings and tracks the active tag and expression
///
/// One context belongs to exactly one compilation session.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsContext {
    diagnostics: Vec<Diagnostic>,

    /// Per-code severity overrides from configuration
    severity: SeverityThreshold,

    /// Stamped on every diagnostic recorded while set
    location: Option<Location>,

    current_tag: Option<String>,
    current_expression: Option<String>,
}

impl DiagnosticsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(severity: SeverityThreshold) -> Self {
        Self {
            severity,
            ..Self::default()
        }
    }

    /// Record a diagnostic, applying severity overrides
    pub fn record(&mut self, code: DiagnosticCode, default: Severity, message: impl Into<String>) {
        let severity = self.severity.get_severity(code, default);
        let mut diagnostic = Diagnostic::new(code, severity, message);

        if let Some(location) = &self.location {
            diagnostic = diagnostic.with_location(location.clone());
        }
        if let Some(expression) = &self.current_expression {
            diagnostic = diagnostic.with_expression(expression.clone());
        }

        match severity {
            Severity::Error => tracing::error!(code = %code, "{}", diagnostic),
            Severity::Warn => tracing::warn!(code = %code, "{}", diagnostic),
            Severity::Info => tracing::info!(code = %code, "{}", diagnostic),
        }

        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.record(code, Severity::Error, message);
    }

    pub fn warning(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.record(code, Severity::Warn, message);
    }

    /// Number of errors recorded so far
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warnings recorded so far
    pub fn warnings(&self) -> usize {
        self.count(Severity::Warn)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.messages(Severity::Warn)
    }

    fn messages(&self, severity: Severity) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.to_string())
            .collect()
    }

    /// All diagnostics, in the order they were recorded
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn set_location(&mut self, location: Option<Location>) {
        self.location = location;
    }

    pub fn current_tag(&self) -> Option<&str> {
        self.current_tag.as_deref()
    }

    /// Replace the active tag, returning the previous one
    pub fn set_tag(&mut self, tag: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.current_tag, tag)
    }

    pub fn current_expression(&self) -> Option<&str> {
        self.current_expression.as_deref()
    }

    pub fn set_expression(&mut self, expression: Option<String>) {
        self.current_expression = expression;
    }
}
