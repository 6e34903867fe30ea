//! ORS Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults that reproduce the built-in heuristics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Per-jurisdiction lexicon extensions
    pub lexicon: LexiconConfig,

    /// Company/person classification switches
    pub classifier: ClassifierConfig,

    /// Person-name ordering heuristics
    pub scoring: ScoringConfig,

    /// Output conventions
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("ORS_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("ORS_LOG_JSON") {
            config.logging.json_format = parse_bool("ORS_LOG_JSON", &json)?;
        }
        if let Ok(share) = std::env::var("ORS_SHARE_AS_COMPANY") {
            config.classifier.share_annotation_as_company =
                parse_bool("ORS_SHARE_AS_COMPANY", &share)?;
        }
        if let Ok(nulls) = std::env::var("ORS_NULL_OPTIONAL_FIELDS") {
            config.output.null_optional_fields = parse_bool("ORS_NULL_OPTIONAL_FIELDS", &nulls)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }
        if std::env::var("ORS_SHARE_AS_COMPANY").is_ok() {
            self.classifier.share_annotation_as_company =
                env_config.classifier.share_annotation_as_company;
        }
        if env_config.output.null_optional_fields {
            self.output.null_optional_fields = true;
        }

        Ok(self)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Additional lexicon entries, merged into the built-in tables
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LexiconConfig {
    /// Extra single-token company keywords (e.g. "PARISH", "LEVEE")
    pub company_keywords: Vec<String>,

    /// Extra multi-word company phrases (e.g. "WATER MANAGEMENT")
    pub company_phrases: Vec<String>,

    /// Extra ownership designators stripped as noise (e.g. "JT RS")
    pub noise_phrases: Vec<String>,

    /// Extra honorific prefixes
    pub prefixes: Vec<String>,

    /// Extra name suffixes
    pub suffixes: Vec<String>,

    /// Extra common given names
    pub first_names: Vec<String>,

    /// Extra placeholder entries (e.g. "OWNER OF RECORD")
    pub placeholders: Vec<String>,
}

/// Classification switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Treat `%` signs and parenthetical share annotations as company markers
    pub share_annotation_as_company: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            share_annotation_as_company: true,
        }
    }
}

/// Weights of the person-name ordering features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Given name longer than one letter
    pub nontrivial_first: f32,
    /// Surname longer than one letter
    pub nontrivial_last: f32,
    /// Surname equals the carried surname
    pub carried_surname_match: f32,
    /// Ordering agrees with the segment hint
    pub order_hint_agrees: f32,
    /// Given name is a known common first name
    pub common_first_name: f32,
    /// Given name is a single letter
    pub single_letter_first: f32,
    /// Surname is a single letter
    pub single_letter_last: f32,
    /// A name field is itself a prefix or suffix token
    pub affix_in_name_field: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            nontrivial_first: 2.0,
            nontrivial_last: 2.0,
            carried_surname_match: 1.5,
            order_hint_agrees: 0.5,
            common_first_name: 1.0,
            single_letter_first: -2.0,
            single_letter_last: -1.0,
            affix_in_name_field: -10.0,
        }
    }
}

/// Person-name ordering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,

    /// Winning candidates scoring below this are rejected
    pub min_accept_score: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_accept_score: 0.0,
        }
    }
}

/// Output conventions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit absent person fields as `null` instead of omitting them
    pub null_optional_fields: bool,

    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.classifier.share_annotation_as_company);
        assert!(!config.output.null_optional_fields);
        assert_eq!(config.scoring.weights.carried_surname_match, 1.5);
        assert_eq!(config.scoring.weights.affix_in_name_field, -10.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [lexicon]
            company_keywords = ["LEVEE"]

            [scoring.weights]
            common_first_name = 0.0

            [output]
            null_optional_fields = true
            "#,
        )
        .unwrap();

        assert_eq!(config.lexicon.company_keywords, vec!["LEVEE".to_string()]);
        assert_eq!(config.scoring.weights.common_first_name, 0.0);
        assert_eq!(config.scoring.weights.nontrivial_first, 2.0);
        assert!(config.output.null_optional_fields);
        assert!(config.classifier.share_annotation_as_company);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/nonexistent/ors.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "yes").unwrap());
        assert!(!parse_bool("K", "0").unwrap());
        assert!(parse_bool("K", "maybe").is_err());
    }
}
