//! Compilation report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diagnostic::{Diagnostic, Severity};
use crate::token::SchemeDetails;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of diagnostics
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Number of tokens accepted by the sink
    pub tokens_created: usize,

    /// Number of scheme sources processed
    pub schemes_compiled: usize,
}

/// Compilation report (report.json v1)
///
/// Diagnostics keep the order in which they were recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Details of the compiled schemes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<SchemeDetails>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            diagnostics: Vec::new(),
            schemes: Vec::new(),
        }
    }

    /// Create a report from diagnostics
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut report = Self::new();
        for diagnostic in diagnostics {
            report.add_diagnostic(diagnostic);
        }
        report
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }

        self.summary.total += 1;
        self.diagnostics.push(diagnostic);
    }

    /// Fold another report into this one (batch compilation)
    pub fn merge(&mut self, other: Report) {
        self.summary.tokens_created += other.summary.tokens_created;
        self.summary.schemes_compiled += other.summary.schemes_compiled;
        self.schemes.extend(other.schemes);
        for diagnostic in other.diagnostics {
            self.add_diagnostic(diagnostic);
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Messages of all error diagnostics, in order
    pub fn error_messages(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    /// Messages of all warning diagnostics, in order
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

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, DiagnosticCode};

    #[test]
    fn empty_report() {
        let report = Report::new();
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn report_with_diagnostics() {
        let diagnostics = vec![
            Diagnostic::warning(DiagnosticCode::ShapeExtraValues, "too many values"),
            Diagnostic::error(DiagnosticCode::SinkRejected, "duplicate token"),
            Diagnostic::new(DiagnosticCode::Info, Severity::Info, "All good"),
        ];

        let report = Report::from_diagnostics(diagnostics);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.summary.info, 1);
        assert!(report.has_errors());
        assert_eq!(report.error_messages(), vec!["duplicate token".to_string()]);
        assert_eq!(report.warning_messages(), vec!["too many values".to_string()]);
    }

    #[test]
    fn merge_keeps_order_and_counts() {
        let mut first = Report::from_diagnostics(vec![Diagnostic::error(
            DiagnosticCode::ListNested,
            "first",
        )]);
        first.summary.tokens_created = 4;

        let mut second = Report::from_diagnostics(vec![Diagnostic::warning(
            DiagnosticCode::Warning,
            "second",
        )]);
        second.summary.tokens_created = 6;
        second.summary.schemes_compiled = 1;

        first.merge(second);
        assert_eq!(first.summary.tokens_created, 10);
        assert_eq!(first.summary.schemes_compiled, 1);
        assert_eq!(first.summary.total, 2);
        assert_eq!(first.diagnostics[1].message, "second");
    }

    #[test]
    fn report_serialization() {
        let report = Report::new();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"diagnostics\""));
        assert!(!json.contains("\"schemes\""));
    }
}
