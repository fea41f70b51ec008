//! Rule file loading from disk.
//!
//! The format is picked from the file extension: `.json` and `.toml` are
//! parsed as such, everything else as YAML.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Rule, RuleDocument};

/// Error type for rule file loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Supported rule file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Yaml,
    Json,
    Toml,
}

impl RuleFormat {
    /// Pick the format for a path by its extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RuleFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => RuleFormat::Toml,
            _ => RuleFormat::Yaml,
        }
    }
}

/// Parse rule file content. Any missing or mistyped field rejects the
/// whole document; field values themselves are not second-guessed.
pub fn parse_rules(content: &str, format: RuleFormat) -> Result<Vec<Rule>, ConfigError> {
    let rules: Vec<Rule> = match format {
        RuleFormat::Yaml => {
            // An empty YAML document is null, not an empty sequence.
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_yaml::from_str(content)?
            }
        }
        RuleFormat::Json => serde_json::from_str(content)?,
        RuleFormat::Toml => toml::from_str::<RuleDocument>(content)?.rules,
    };

    Ok(rules)
}

/// Load a rule file.
pub fn load_rules(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_rules(&content, RuleFormat::from_path(path))
}
