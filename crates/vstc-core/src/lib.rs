//! vstc core
//!
//! Core domain model with stable, versioned types.
//! Never rename diagnostic codes or token codes - they are part of the public API.

pub mod diagnostic;
pub mod token;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use token::{Token, TokenType, MatchType, Priority, AcceptCondition, SchemeDetails};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, DefaultSymbols, OutputConfig, SeverityThreshold};
