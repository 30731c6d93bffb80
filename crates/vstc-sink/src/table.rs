//! Compiled symbol table dump
//!
//! The JSON layout is what `vstc compile` writes next to each scheme and what
//! `vstc schemes` reads back.

use serde::{Deserialize, Serialize};
use std::path::Path;
use vstc_core::{SchemeDetails, Token, TokenType};

/// Suffix rewriting rule used by the stemmer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemRule {
    pub old_ending: String,
    pub new_ending: String,
}

/// Word ending that a stem rule must not touch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemException {
    pub rule: String,
    pub exception: String,
}

/// Everything a sink persisted for one scheme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<SchemeDetails>,

    #[serde(default)]
    pub tokens: Vec<Token>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stem_rules: Vec<StemRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stem_exceptions: Vec<StemException>,
}

/// Table I/O errors
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SymbolTable {
    /// Number of tokens of one type
    pub fn count(&self, token_type: TokenType) -> usize {
        self.tokens.iter().filter(|t| t.token_type == token_type).count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), TableError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
