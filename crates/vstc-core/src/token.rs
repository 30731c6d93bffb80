//! Token types and the compiled-table vocabulary
//!
//! Numeric codes are the values the transliteration engine stores. They are
//! part of the compiled table format and must not change.

use serde::{Deserialize, Serialize};

/// Semantic class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Vowel,
    Consonant,
    DeadConsonant,
    ConsonantVowel,
    Number,
    Symbol,
    Anusvara,
    Visarga,
    Virama,
    Other,
    NonJoiner,
    Joiner,
    Period,
}

impl TokenType {
    /// Every token type, in code order
    pub const ALL: [TokenType; 13] = [
        Self::Vowel,
        Self::Consonant,
        Self::DeadConsonant,
        Self::ConsonantVowel,
        Self::Number,
        Self::Symbol,
        Self::Anusvara,
        Self::Visarga,
        Self::Virama,
        Self::Other,
        Self::NonJoiner,
        Self::Joiner,
        Self::Period,
    ];

    /// Engine code for this token type
    pub fn code(&self) -> i32 {
        match self {
            Self::Vowel => 1,
            Self::Consonant => 2,
            Self::DeadConsonant => 3,
            Self::ConsonantVowel => 4,
            Self::Number => 5,
            Self::Symbol => 6,
            Self::Anusvara => 7,
            Self::Visarga => 8,
            Self::Virama => 9,
            Self::Other => 10,
            Self::NonJoiner => 11,
            Self::Joiner => 12,
            Self::Period => 13,
        }
    }

    /// Look up a token type by its engine code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Name used by scheme sources (`vowels`, `consonant_vowel_combinations`, ...)
    pub fn category_name(&self) -> &'static str {
        match self {
            Self::Vowel => "vowels",
            Self::Consonant => "consonants",
            Self::DeadConsonant => "dead_consonants",
            Self::ConsonantVowel => "consonant_vowel_combinations",
            Self::Number => "numbers",
            Self::Symbol => "symbols",
            Self::Anusvara => "anusvara",
            Self::Visarga => "visarga",
            Self::Virama => "virama",
            Self::Other => "others",
            Self::NonJoiner => "non_joiner",
            Self::Joiner => "joiner",
            Self::Period => "period",
        }
    }

    /// Look up a token type by its scheme category name
    pub fn from_category_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.category_name() == name)
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category_name())
    }
}

/// Whether a pattern must match completely or is one of several spellings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Possibility,
}

impl MatchType {
    pub fn code(&self) -> i32 {
        match self {
            Self::Exact => 1,
            Self::Possibility => 2,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::Possibility => write!(f, "POSSIBILITY"),
        }
    }
}

/// Token priority band, or a raw engine value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Raw(i32),
}

impl Priority {
    /// Engine value. Lower values are stricter.
    pub fn value(&self) -> i32 {
        match self {
            Self::Low => -1,
            Self::Normal => 0,
            Self::High => 1,
            Self::Raw(v) => *v,
        }
    }

    /// Canonical priority for an engine value
    pub fn from_value(value: i32) -> Self {
        match value {
            -1 => Self::Low,
            0 => Self::Normal,
            1 => Self::High,
            other => Self::Raw(other),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

/// Where in a word a pattern may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptCondition {
    All,
    StartsWith,
    InBetween,
    EndsWith,
    Raw(i32),
}

impl AcceptCondition {
    pub fn code(&self) -> i32 {
        match self {
            Self::All => 0,
            Self::StartsWith => 1,
            Self::InBetween => 2,
            Self::EndsWith => 3,
            Self::Raw(v) => *v,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::All,
            1 => Self::StartsWith,
            2 => Self::InBetween,
            3 => Self::EndsWith,
            other => Self::Raw(other),
        }
    }

    pub fn is_all(&self) -> bool {
        self.code() == 0
    }
}

impl Default for AcceptCondition {
    fn default() -> Self {
        Self::All
    }
}

/// A single entry of the compiled table
///
/// Tokens are never mutated once they are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,

    /// Input sequence the engine matches against. Never empty.
    pub pattern: String,

    /// Primary output. Never empty.
    pub value1: String,

    /// Alternative output, empty if absent
    #[serde(default)]
    pub value2: String,

    /// Second alternative output, empty if absent
    #[serde(default)]
    pub value3: String,

    /// Grouping label, empty if none was active
    #[serde(default)]
    pub tag: String,

    pub match_type: MatchType,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub accept_condition: AcceptCondition,
}

impl Token {
    /// Create an exact-match token with default priority and accept condition
    pub fn new(
        token_type: TokenType,
        pattern: impl Into<String>,
        value1: impl Into<String>,
    ) -> Self {
        Self {
            token_type,
            pattern: pattern.into(),
            value1: value1.into(),
            value2: String::new(),
            value3: String::new(),
            tag: String::new(),
            match_type: MatchType::Exact,
            priority: Priority::Normal,
            accept_condition: AcceptCondition::All,
        }
    }

    pub fn with_values(mut self, value2: impl Into<String>, value3: impl Into<String>) -> Self {
        self.value2 = value2.into();
        self.value3 = value3.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_accept_condition(mut self, accept_condition: AcceptCondition) -> Self {
        self.accept_condition = accept_condition;
        self
    }

    pub fn is_possibility(&self) -> bool {
        self.match_type == MatchType::Possibility
    }
}

/// Scheme metadata, persisted once per compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDetails {
    pub language_code: String,
    pub identifier: String,
    pub display_name: String,
    pub author: String,

    /// RFC 3339 timestamp of the compilation
    pub compiled_date: String,

    pub is_stable: bool,
}
