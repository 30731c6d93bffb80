//! Token sink trait: the storage side of the transliteration engine

use vstc_core::{SchemeDetails, Token, TokenType};

/// Errors a sink reports back to the compiler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("{0}")]
    Rejected(String),

    #[error("Duplicate token: {pattern} => {value}")]
    Duplicate { pattern: String, value: String },

    #[error("Length of pattern, tag, value1, value2 or value3 should be less than {max}")]
    TooLong { max: usize },

    #[error("Virama needs to be set before auto generating dead consonants")]
    ViramaMissing,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid scheme details: {0}")]
    InvalidDetails(String),
}

/// Engine-level switches a scheme may toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOption {
    /// Derive dead consonants from consonants that carry the inherent vowel
    InferDeadConsonants(bool),

    /// Skip duplicate tokens instead of rejecting them
    IgnoreDuplicates(bool),

    /// Letter a consonant pattern ends in when it carries the inherent vowel
    InherentVowel(char),
}

/// Trait for engines that persist compiled tokens
///
/// The compiler owns exactly one sink for the duration of a compilation and
/// calls it sequentially.
pub trait TokenSink {
    /// Get the sink name (e.g., "memory")
    fn name(&self) -> &'static str;

    /// Persist a single token
    fn create_token(&mut self, token: &Token) -> Result<(), SinkError>;

    /// Write buffered tokens to storage
    fn flush(&mut self) -> Result<(), SinkError>;

    /// All tokens of a type known to the engine, including derived ones
    fn get_all_tokens(&self, token_type: TokenType) -> Result<Vec<Token>, SinkError>;

    /// Persist the scheme metadata
    fn set_scheme_details(&mut self, details: &SchemeDetails) -> Result<(), SinkError>;

    /// Persist a suffix rewriting rule
    fn create_stem_rule(&mut self, old_ending: &str, new_ending: &str) -> Result<(), SinkError>;

    /// Persist an exception to a stem rule
    fn create_stem_exception(&mut self, rule: &str, exception: &str) -> Result<(), SinkError>;

    /// Toggle an engine option
    fn configure(&mut self, option: SinkOption) -> Result<(), SinkError>;
}

impl<T: TokenSink + ?Sized> TokenSink for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn create_token(&mut self, token: &Token) -> Result<(), SinkError> {
        (**self).create_token(token)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn get_all_tokens(&self, token_type: TokenType) -> Result<Vec<Token>, SinkError> {
        (**self).get_all_tokens(token_type)
    }

    fn set_scheme_details(&mut self, details: &SchemeDetails) -> Result<(), SinkError> {
        (**self).set_scheme_details(details)
    }

    fn create_stem_rule(&mut self, old_ending: &str, new_ending: &str) -> Result<(), SinkError> {
        (**self).create_stem_rule(old_ending, new_ending)
    }

    fn create_stem_exception(&mut self, rule: &str, exception: &str) -> Result<(), SinkError> {
        (**self).create_stem_exception(rule, exception)
    }

    fn configure(&mut self, option: SinkOption) -> Result<(), SinkError> {
        (**self).configure(option)
    }
}
