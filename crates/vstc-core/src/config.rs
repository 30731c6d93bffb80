//! Configuration schema (vstc.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use crate::diagnostic::{DiagnosticCode, Severity};

/// Severity threshold overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a diagnostic code, or default
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

/// Patterns injected when a scheme does not declare its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultSymbols {
    /// Inject the defaults at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_non_joiner")]
    pub non_joiner: String,

    #[serde(default = "default_joiner")]
    pub joiner: String,

    /// Always added as a symbol mapping to itself
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_true() -> bool {
    true
}

fn default_non_joiner() -> String {
    "_".to_string()
}

fn default_joiner() -> String {
    "__".to_string()
}

fn default_separator() -> String {
    "-".to_string()
}

impl Default for DefaultSymbols {
    fn default() -> Self {
        Self {
            enabled: true,
            non_joiner: default_non_joiner(),
            joiner: default_joiner(),
            separator: default_separator(),
        }
    }
}

/// Where compiled tables go
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the config file; next to the scheme file when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Letter carrying the inherent vowel sound of a bare consonant
    #[serde(default = "default_inherent_vowel")]
    pub inherent_vowel: char,

    /// Severity thresholds
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Default joiner / non-joiner / separator symbols
    #[serde(default)]
    pub defaults: DefaultSymbols,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Directory holding the config file; relative paths resolve against it
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_inherent_vowel() -> char {
    'a'
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inherent_vowel: default_inherent_vowel(),
            severity: SeverityThreshold::default(),
            defaults: DefaultSymbols::default(),
            output: OutputConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.inherent_vowel.is_whitespace() {
            return Err(ConfigError::InvalidValue {
                field: "inherent_vowel".to_string(),
                reason: "must be a letter".to_string(),
            });
        }

        if config.project_root.as_os_str().is_empty() {
            config.project_root = std::env::current_dir().unwrap_or_default();
        }

        Ok(config)
    }

    /// Configured output directory, joined onto the project root when relative
    pub fn output_directory(&self) -> Option<PathBuf> {
        self.output.directory.as_ref().map(|dir| self.project_root.join(dir))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
