//! In-memory token sink
//!
//! This sink keeps the compiled table in memory and applies the same
//! token-level checks the transliteration engine applies on insert:
//! - symbol length limits
//! - duplicate detection (or silent skipping when duplicates are ignored)
//! - dead consonant inference from consonants carrying the inherent vowel
//! - zero-width joiner / non-joiner substitution
//!
//! It is used by the CLI to produce a table dump and by tests, which can also
//! simulate engine failures.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vstc_sink::{MemorySink, TokenSink};
//! use vstc_core::{Token, TokenType};
//!
//! let mut sink = MemorySink::new();
//! sink.create_token(&Token::new(TokenType::Vowel, "a", "അ"))?;
//! sink.flush()?;
//! assert_eq!(sink.token_count(), 1);
//! ```

use crate::sink::{SinkError, SinkOption, TokenSink};
use crate::table::{StemException, StemRule, SymbolTable};
use std::collections::HashMap;
use vstc_core::{SchemeDetails, Token, TokenType};

/// Longest pattern, value or tag the engine stores, in bytes
pub const SYMBOL_MAX: usize = 30;

/// Zero width non-joiner
pub const ZWNJ: &str = "\u{200C}";

/// Zero width joiner
pub const ZWJ: &str = "\u{200D}";

/// In-memory token sink
#[derive(Debug, Clone)]
pub struct MemorySink {
    /// Tokens written by `flush`
    tokens: Vec<Token>,

    /// Tokens accepted since the last flush
    buffer: Vec<Token>,

    stem_rules: Vec<StemRule>,
    stem_exceptions: Vec<StemException>,
    details: Option<SchemeDetails>,

    infer_dead_consonants: bool,
    ignore_duplicates: bool,

    /// Letter whose trailing presence makes a consonant droppable to a dead one
    inherent_vowel: char,

    /// Patterns to reject, with the reason to report
    rejections: HashMap<String, String>,

    /// Simulate a storage failure on flush
    fail_flush: bool,
}

impl Default for MemorySink {
    /// Duplicates are skipped and the inherent vowel is `a`, like the engine
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            buffer: Vec::new(),
            stem_rules: Vec::new(),
            stem_exceptions: Vec::new(),
            details: None,
            infer_dead_consonants: false,
            ignore_duplicates: true,
            inherent_vowel: 'a',
            rejections: HashMap::new(),
            fail_flush: false,
        }
    }
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previously exported table
    pub fn from_table(table: SymbolTable) -> Self {
        Self {
            tokens: table.tokens,
            stem_rules: table.stem_rules,
            stem_exceptions: table.stem_exceptions,
            details: table.details,
            ..Self::default()
        }
    }

    /// Reject every token with this pattern
    pub fn with_rejection(mut self, pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rejections.insert(pattern.into(), reason.into());
        self
    }

    /// Fail every flush with a storage error
    pub fn with_flush_failure(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    /// Number of tokens written by `flush`
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Number of tokens waiting for `flush`
    pub fn buffered_count(&self) -> usize {
        self.buffer.len()
    }

    /// Flushed tokens, in insertion order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn details(&self) -> Option<&SchemeDetails> {
        self.details.as_ref()
    }

    pub fn stem_rules(&self) -> &[StemRule] {
        &self.stem_rules
    }

    pub fn stem_exceptions(&self) -> &[StemException] {
        &self.stem_exceptions
    }

    /// Export the flushed state
    pub fn to_table(&self) -> SymbolTable {
        SymbolTable {
            details: self.details.clone(),
            tokens: self.tokens.clone(),
            stem_rules: self.stem_rules.clone(),
            stem_exceptions: self.stem_exceptions.clone(),
        }
    }

    fn all_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().chain(self.buffer.iter())
    }

    fn virama(&self) -> Option<&Token> {
        self.all_tokens().find(|t| t.token_type == TokenType::Virama)
    }

    fn persist(&mut self, token: Token) -> Result<(), SinkError> {
        let duplicate = self.all_tokens().any(|t| {
            t.token_type == token.token_type && t.pattern == token.pattern && t.value1 == token.value1
        });

        if duplicate {
            if self.ignore_duplicates {
                tracing::warn!(pattern = %token.pattern, value = %token.value1, "ignoring duplicate token");
                return Ok(());
            }
            return Err(SinkError::Duplicate {
                pattern: token.pattern,
                value: token.value1,
            });
        }

        tracing::debug!(
            pattern = %token.pattern,
            value = %token.value1,
            token_type = %token.token_type,
            "buffered token"
        );
        self.buffer.push(token);
        Ok(())
    }
}

/// A pattern whose last letter is a single inherent vowel has a dead form
fn can_generate_dead_consonant(pattern: &str, inherent: char) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    match chars.as_slice() {
        [.., before, last] => *last == inherent && *before != inherent,
        _ => false,
    }
}

fn check_lengths(token: &Token) -> Result<(), SinkError> {
    let fields = [
        &token.pattern,
        &token.value1,
        &token.value2,
        &token.value3,
        &token.tag,
    ];
    if fields.iter().any(|f| f.len() > SYMBOL_MAX) {
        return Err(SinkError::TooLong { max: SYMBOL_MAX });
    }
    Ok(())
}

impl TokenSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create_token(&mut self, token: &Token) -> Result<(), SinkError> {
        if let Some(reason) = self.rejections.get(&token.pattern) {
            return Err(SinkError::Rejected(reason.clone()));
        }
        if token.pattern.is_empty() || token.value1.is_empty() {
            return Err(SinkError::Rejected("pattern and value1 are required".to_string()));
        }
        check_lengths(token)?;

        let mut token = token.clone();

        // Everything buffered by this call is dropped if any part of it fails
        let mark = self.buffer.len();

        if token.token_type == TokenType::Consonant && self.infer_dead_consonants {
            let virama = self.virama().ok_or(SinkError::ViramaMissing)?.value1.clone();

            if token.value1.ends_with(&virama) {
                token.token_type = TokenType::DeadConsonant;
            } else if can_generate_dead_consonant(&token.pattern, self.inherent_vowel) {
                let mut pattern = token.pattern.clone();
                pattern.pop();

                let value2 = if token.value2.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", token.value2, virama)
                };

                let dead = Token {
                    token_type: TokenType::DeadConsonant,
                    pattern,
                    value1: format!("{}{}", token.value1, virama),
                    value2,
                    ..token.clone()
                };
                check_lengths(&dead)?;
                self.persist(dead)?;
            }
        }

        match token.token_type {
            TokenType::NonJoiner => {
                token.value1 = ZWNJ.to_string();
                token.value2 = ZWNJ.to_string();
            }
            TokenType::Joiner => {
                token.value1 = ZWJ.to_string();
                token.value2 = ZWJ.to_string();
            }
            _ => {}
        }

        let result = self.persist(token);
        if result.is_err() {
            self.buffer.truncate(mark);
        }
        result
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.fail_flush {
            return Err(SinkError::Storage("Simulated flush failure".to_string()));
        }
        tracing::debug!(count = self.buffer.len(), "flushing buffered tokens");
        self.tokens.append(&mut self.buffer);
        Ok(())
    }

    fn get_all_tokens(&self, token_type: TokenType) -> Result<Vec<Token>, SinkError> {
        Ok(self
            .all_tokens()
            .filter(|t| t.token_type == token_type)
            .cloned()
            .collect())
    }

    fn set_scheme_details(&mut self, details: &SchemeDetails) -> Result<(), SinkError> {
        if details.language_code.is_empty() {
            return Err(SinkError::InvalidDetails("language code is required".to_string()));
        }
        if details.identifier.is_empty() {
            return Err(SinkError::InvalidDetails("identifier is required".to_string()));
        }
        self.details = Some(details.clone());
        Ok(())
    }

    fn create_stem_rule(&mut self, old_ending: &str, new_ending: &str) -> Result<(), SinkError> {
        if old_ending.is_empty() || new_ending.is_empty() {
            return Err(SinkError::Rejected("No ending supplied".to_string()));
        }
        self.stem_rules.push(StemRule {
            old_ending: old_ending.to_string(),
            new_ending: new_ending.to_string(),
        });
        Ok(())
    }

    fn create_stem_exception(&mut self, rule: &str, exception: &str) -> Result<(), SinkError> {
        if rule.is_empty() {
            return Err(SinkError::Rejected("No rule".to_string()));
        }
        if exception.is_empty() {
            return Err(SinkError::Rejected("Invalid exception supplied".to_string()));
        }
        self.stem_exceptions.push(StemException {
            rule: rule.to_string(),
            exception: exception.to_string(),
        });
        Ok(())
    }

    fn configure(&mut self, option: SinkOption) -> Result<(), SinkError> {
        match option {
            SinkOption::InferDeadConsonants(enabled) => self.infer_dead_consonants = enabled,
            SinkOption::IgnoreDuplicates(enabled) => self.ignore_duplicates = enabled,
            SinkOption::InherentVowel(letter) => self.inherent_vowel = letter,
        }
        Ok(())
    }
}
