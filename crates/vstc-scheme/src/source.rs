//! Scheme source files (`*.scheme.toml`)
//!
//! A scheme is a `[scheme]` metadata table followed by an ordered array of
//! `[[step]]` tables. Each step names its operation in `op`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use vstc_compiler::SchemeValue;
use vstc_core::TokenType;

/// A parsed scheme file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeSource {
    /// Scheme metadata
    #[serde(default)]
    pub scheme: SchemeHeader,

    /// Steps, in execution order
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl SchemeSource {
    /// Load a scheme from file
    pub fn from_file(path: &Path) -> Result<Self, SchemeError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SchemeError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_str(&contents)
    }

    /// Parse a scheme from a TOML string
    pub fn from_str(toml: &str) -> Result<Self, SchemeError> {
        toml::from_str(toml).map_err(|e| SchemeError::ParseError(e.to_string()))
    }
}

/// `[scheme]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeHeader {
    #[serde(default)]
    pub language_code: Option<String>,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub stable: Option<bool>,
}

/// One `[[step]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Vowels(CategoryStep),
    Consonants(CategoryStep),
    ConsonantVowelCombinations(CategoryStep),
    Anusvara(CategoryStep),
    Visarga(CategoryStep),
    Virama(CategoryStep),
    Symbols(CategoryStep),
    Numbers(CategoryStep),
    Others(CategoryStep),

    Joiner {
        tokens: toml::Value,
    },
    NonJoiner {
        tokens: toml::Value,
    },
    Period {
        value: toml::Value,
    },

    /// Run nested steps with a tag set
    Tag {
        name: String,
        #[serde(default)]
        steps: Vec<Step>,
    },

    /// Run nested steps with a list scope open
    List {
        #[serde(default)]
        names: Vec<toml::Value>,
        #[serde(default)]
        steps: Vec<Step>,
    },

    GenerateCv,

    StemRules {
        tokens: toml::Value,
    },
    StemExceptions {
        tokens: toml::Value,
    },

    InferDeadConsonants {
        enabled: bool,
    },
    IgnoreDuplicates {
        enabled: bool,
    },
}

impl Step {
    /// Token type and body of a category declaration
    pub fn category(&self) -> Option<(TokenType, &CategoryStep)> {
        let pair = match self {
            Self::Vowels(step) => (TokenType::Vowel, step),
            Self::Consonants(step) => (TokenType::Consonant, step),
            Self::ConsonantVowelCombinations(step) => (TokenType::ConsonantVowel, step),
            Self::Anusvara(step) => (TokenType::Anusvara, step),
            Self::Visarga(step) => (TokenType::Visarga, step),
            Self::Virama(step) => (TokenType::Virama, step),
            Self::Symbols(step) => (TokenType::Symbol, step),
            Self::Numbers(step) => (TokenType::Number, step),
            Self::Others(step) => (TokenType::Other, step),
            _ => return None,
        };
        Some(pair)
    }

    /// Name of the operation, as written in `op`
    pub fn op(&self) -> &'static str {
        match self {
            Self::Vowels(_) => "vowels",
            Self::Consonants(_) => "consonants",
            Self::ConsonantVowelCombinations(_) => "consonant_vowel_combinations",
            Self::Anusvara(_) => "anusvara",
            Self::Visarga(_) => "visarga",
            Self::Virama(_) => "virama",
            Self::Symbols(_) => "symbols",
            Self::Numbers(_) => "numbers",
            Self::Others(_) => "others",
            Self::Joiner { .. } => "joiner",
            Self::NonJoiner { .. } => "non_joiner",
            Self::Period { .. } => "period",
            Self::Tag { .. } => "tag",
            Self::List { .. } => "list",
            Self::GenerateCv => "generate_cv",
            Self::StemRules { .. } => "stem_rules",
            Self::StemExceptions { .. } => "stem_exceptions",
            Self::InferDeadConsonants { .. } => "infer_dead_consonants",
            Self::IgnoreDuplicates { .. } => "ignore_duplicates",
        }
    }
}

/// Body of a category declaration
///
/// Exactly one of `tokens` and `combine` is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStep {
    #[serde(default)]
    pub priority: Option<toml::Value>,

    #[serde(default)]
    pub accept_if: Option<toml::Value>,

    #[serde(default)]
    pub tokens: Option<toml::Value>,

    #[serde(default)]
    pub combine: Option<CombineStep>,
}

/// `combine = { source = {...}, template = ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineStep {
    pub source: CombineSource,
    pub template: toml::Value,
}

/// Where combined tokens come from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombineSource {
    /// A category name such as `vowels` or `dead_consonants`
    #[serde(default)]
    pub category: Option<String>,

    /// A custom list name
    #[serde(default)]
    pub list: Option<String>,

    /// `{}` for all tokens, `{ exact = true }` for exact matches only
    #[serde(default)]
    pub filter: Option<toml::Value>,
}

/// Convert a TOML value as is
pub fn scheme_value(value: &toml::Value) -> SchemeValue {
    match value {
        toml::Value::String(s) => SchemeValue::Str(s.clone()),
        toml::Value::Integer(i) => SchemeValue::Int(*i),
        toml::Value::Boolean(b) => SchemeValue::Bool(*b),
        toml::Value::Array(items) => SchemeValue::List(items.iter().map(scheme_value).collect()),
        toml::Value::Table(table) => SchemeValue::Map(
            table
                .iter()
                .map(|(k, v)| (SchemeValue::Str(k.clone()), scheme_value(v)))
                .collect(),
        ),
        toml::Value::Float(_) => SchemeValue::Other {
            kind: "float".to_string(),
        },
        toml::Value::Datetime(_) => SchemeValue::Other {
            kind: "datetime".to_string(),
        },
    }
}

/// Convert a TOML value that is meant to be a pattern => value mapping
///
/// TOML table keys are always strings, so an array of `[key, value]` pairs is
/// accepted as well. Anything else is converted as is and left for the
/// validator to reject.
pub fn mapping_value(value: &toml::Value) -> SchemeValue {
    match value {
        toml::Value::Array(items) if items.iter().all(is_pair) => SchemeValue::Map(
            items
                .iter()
                .filter_map(|item| match item {
                    toml::Value::Array(pair) => match pair.as_slice() {
                        [key, value] => Some((scheme_value(key), scheme_value(value))),
                        _ => None,
                    },
                    _ => None,
                })
                .collect(),
        ),
        other => scheme_value(other),
    }
}

fn is_pair(value: &toml::Value) -> bool {
    matches!(value, toml::Value::Array(pair) if pair.len() == 2)
}

/// Scheme source errors
#[derive(Debug, thiserror::Error)]
pub enum SchemeError {
    #[error("Failed to read scheme file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse scheme: {0}")]
    ParseError(String),

    #[error("Invalid {op} step: {message}")]
    InvalidStep { op: String, message: String },

    #[error(transparent)]
    Compile(#[from] vstc_compiler::CompileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_steps_in_order() {
        let source = SchemeSource::from_str(
            r#"
[scheme]
language_code = "ml"
identifier = "ml-unicode"
stable = true

[[step]]
op = "virama"
tokens = { "~" = "്" }

[[step]]
op = "vowels"
priority = "high"
tokens = [["a", "അ"], [["aa", "A"], ["ആ", "ാ"]]]

[[step]]
op = "generate_cv"

[[step]]
op = "tag"
name = "chill"

  [[step.steps]]
  op = "consonants"
  tokens = { "n" = "ൻ" }
"#,
        )
        .unwrap();

        assert_eq!(source.scheme.language_code.as_deref(), Some("ml"));
        assert_eq!(source.scheme.stable, Some(true));

        let ops: Vec<&str> = source.steps.iter().map(|s| s.op()).collect();
        assert_eq!(ops, vec!["virama", "vowels", "generate_cv", "tag"]);

        match &source.steps[3] {
            Step::Tag { name, steps } => {
                assert_eq!(name, "chill");
                assert_eq!(steps.len(), 1);
            }
            other => panic!("expected a tag step, got {:?}", other),
        }
    }

    #[test]
    fn table_keys_keep_their_order() {
        let source = SchemeSource::from_str(
            r#"
[[step]]
op = "consonants"
tokens = { "na" = "ന", "ka" = "ക", "ma" = "മ" }
"#,
        )
        .unwrap();

        let (token_type, body) = source.steps[0].category().unwrap();
        assert_eq!(token_type, TokenType::Consonant);

        let mapping = mapping_value(body.tokens.as_ref().unwrap());
        assert_eq!(mapping, SchemeValue::map(vec![("na", "ന"), ("ka", "ക"), ("ma", "മ")]));
    }

    #[test]
    fn pair_arrays_become_mappings() {
        let table: toml::Table = toml::from_str(r#"t = [[["aa", "A"], "ആ"], ["i", ["ഇ", "ി"]]]"#).unwrap();
        let value = table["t"].clone();

        assert_eq!(
            mapping_value(&value),
            SchemeValue::map(vec![
                (SchemeValue::list(vec!["aa", "A"]), SchemeValue::from("ആ")),
                (SchemeValue::from("i"), SchemeValue::list(vec!["ഇ", "ി"])),
            ])
        );
    }

    #[test]
    fn other_shapes_are_left_for_the_validator() {
        let value = toml::Value::Array(vec![toml::Value::String("a".into())]);
        assert_eq!(mapping_value(&value), SchemeValue::list(vec!["a"]));
        assert_eq!(
            scheme_value(&toml::Value::Float(1.5)),
            SchemeValue::Other { kind: "float".into() }
        );
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        let err = SchemeSource::from_str(
            r#"
[[step]]
op = "letters"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemeError::ParseError(_)));
    }

    #[test]
    fn missing_file() {
        let err = SchemeSource::from_file(Path::new("/nonexistent/ml.scheme.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ml.scheme.toml"));
    }
}
