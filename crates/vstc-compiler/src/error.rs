//! Errors that stop a compilation

use vstc_core::DiagnosticCode;

/// A structural misuse of the scheme surface
///
/// These abort the run. Every one of them is also recorded as an error
/// diagnostic before it is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Expected a mapping of pattern => value, but got a {kind}")]
    NotAMapping { kind: String },

    #[error("priority should be normal, low, high or a number, but got {value}")]
    InvalidPriority { value: String },

    #[error("accept_if should be all, starts_with, in_between, ends_with or a number, but got {value}")]
    InvalidAccept { value: String },

    #[error("Can't create nested list")]
    NestedList,

    #[error("List should have a name")]
    UnnamedList,

    #[error("List name should be a string, but got a {kind}")]
    InvalidListName { kind: String },

    #[error("No list named '{0}'")]
    UnknownList(String),

    #[error("Virama is not set")]
    ViramaNotSet,
}

impl CompileError {
    /// Diagnostic code recorded for this error
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::NotAMapping { .. } => DiagnosticCode::ShapeNotAMapping,
            Self::InvalidPriority { .. } => DiagnosticCode::OptionInvalidPriority,
            Self::InvalidAccept { .. } => DiagnosticCode::OptionInvalidAccept,
            Self::NestedList => DiagnosticCode::ListNested,
            Self::UnnamedList => DiagnosticCode::ListUnnamed,
            Self::InvalidListName { .. } => DiagnosticCode::ListInvalidName,
            Self::UnknownList(_) => DiagnosticCode::ListUnknown,
            Self::ViramaNotSet => DiagnosticCode::ViramaNotSet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_messages() {
        assert_eq!(CompileError::NestedList.code(), DiagnosticCode::ListNested);
        assert_eq!(CompileError::NestedList.to_string(), "Can't create nested list");

        let err = CompileError::InvalidPriority { value: "urgent".into() };
        assert_eq!(err.code(), DiagnosticCode::OptionInvalidPriority);
        assert!(err.to_string().contains("urgent"));
    }
}
