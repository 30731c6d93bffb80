//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Shape validation (1xxx)
    /// A token definition was not a pattern => value mapping
    ShapeNotAMapping,

    /// A key or value is not an integer, string or sequence
    ShapeInvalidType,

    /// A sequence with no elements
    ShapeEmptySequence,

    /// An empty pattern or value
    ShapeEmptyValue,

    /// A value sequence with more than three elements
    ShapeExtraValues,

    // Option resolution (2xxx)
    /// `priority` is neither a known band nor an integer
    OptionInvalidPriority,

    /// `accept_if` is neither a known condition nor an integer
    OptionInvalidAccept,

    // List scopes (3xxx)
    /// A list scope was opened inside another one
    ListNested,

    /// A list scope was opened without names
    ListUnnamed,

    /// A list name that is not a string
    ListInvalidName,

    /// A lookup of a list that was never declared
    ListUnknown,

    // Token queries (4xxx)
    /// The virama was requested before it was declared
    ViramaNotSet,

    // Token sink (5xxx)
    /// The sink refused a single token, rule or option
    SinkRejected,

    /// Flushing or persisting metadata failed
    SinkFailure,

    // Scheme source (6xxx)
    /// The scheme file could not be read or has the wrong structure
    SchemeStructure,

    // General (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShapeNotAMapping => "SHAPE_NOT_A_MAPPING",
            Self::ShapeInvalidType => "SHAPE_INVALID_TYPE",
            Self::ShapeEmptySequence => "SHAPE_EMPTY_SEQUENCE",
            Self::ShapeEmptyValue => "SHAPE_EMPTY_VALUE",
            Self::ShapeExtraValues => "SHAPE_EXTRA_VALUES",
            Self::OptionInvalidPriority => "OPTION_INVALID_PRIORITY",
            Self::OptionInvalidAccept => "OPTION_INVALID_ACCEPT",
            Self::ListNested => "LIST_NESTED",
            Self::ListUnnamed => "LIST_UNNAMED",
            Self::ListInvalidName => "LIST_INVALID_NAME",
            Self::ListUnknown => "LIST_UNKNOWN",
            Self::ViramaNotSet => "VIRAMA_NOT_SET",
            Self::SinkRejected => "SINK_REJECTED",
            Self::SinkFailure => "SINK_FAILURE",
            Self::SchemeStructure => "SCHEME_STRUCTURE",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - the scheme still compiles
    Warn,

    /// Error - the compilation is reported as failed
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Position inside a scheme source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Scheme file path
    pub file: String,

    /// 1-indexed top-level step, when known
    pub step: Option<usize>,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            step: None,
        }
    }

    /// Create a location pointing at a step of the scheme
    pub fn with_step(file: impl Into<String>, step: usize) -> Self {
        Self {
            file: file.into(),
            step: Some(step),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.step {
            Some(step) => write!(f, "{} (step {})", self.file, step),
            None => write!(f, "{}", self.file),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// The `pattern => value` expression being processed
    pub expression: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            expression: None,
        }
    }

    /// Shorthand for an error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Shorthand for a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warn, message)
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the expression being processed
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(expression) = &self.expression {
            write!(f, " (in `{}`)", expression)?;
        }
        Ok(())
    }
}
