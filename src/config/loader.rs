//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::DialplanConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and compilation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A stored pattern failed to compile. Validation catches these up
    /// front; this variant keeps table compilation honest about the same
    /// failure mode.
    #[error("pattern \"{name}\" failed to compile: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// A name reference survived validation but resolved to nothing at
    /// compile time.
    #[error("unresolved reference to \"{0}\"")]
    UnresolvedReference(String),
}

impl From<crate::patterns::PatternError> for ConfigError {
    fn from(e: crate::patterns::PatternError) -> Self {
        ConfigError::Pattern {
            name: e.name,
            source: e.source,
        }
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate a dialplan from a TOML file.
pub fn load_config(path: &Path) -> Result<DialplanConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::info!(
        path = %path.display(),
        peers = config.peers.len(),
        patterns = config.patterns.len(),
        rules = config.rules.len(),
        profiles = config.profiles.len(),
        "dialplan loaded"
    );

    Ok(config)
}

/// Parse and validate a dialplan from TOML text.
pub fn parse_config(content: &str) -> Result<DialplanConfig, ConfigError> {
    let config: DialplanConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_example_dialplan() {
        let config = parse_config(include_str!("../../dialplan.example.toml")).unwrap();
        assert_eq!(config.peers.len(), 9);
        assert_eq!(config.policy.preferred.get("zoom"), Some(&1100));
        assert_eq!(config.policy.preferred.get("cucm"), Some(&2100));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse_config("peers = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config(
            r#"
            [[peers]]
            id = 1
            direction = "inbound"
        "#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("validation failed"));
        assert!(message.contains("no origin tag"));
    }
}
