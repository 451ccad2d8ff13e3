//! Engine configuration.
//!
//! # Responsibility
//! - Hold the default language triple used when the first language is
//!   initialized without a caller-supplied seed.
//! - Load overrides from a JSON document.
//!
//! # Invariants
//! - The configured default code is never blank.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_LANGUAGE_CODE: &str = "ENG";
pub const DEFAULT_LANGUAGE_NAME: &str = "English";
pub const DEFAULT_LANGUAGE_NOTE: &str = "Initial language";

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    BlankDefaultCode,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid engine config: {err}"),
            Self::BlankDefaultCode => write!(f, "initial language code must not be blank"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::BlankDefaultCode => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Default triple for the first language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InitialLanguage {
    pub code: String,
    pub name: String,
    pub note: String,
}

impl Default for InitialLanguage {
    fn default() -> Self {
        Self {
            code: DEFAULT_LANGUAGE_CODE.to_string(),
            name: DEFAULT_LANGUAGE_NAME.to_string(),
            note: DEFAULT_LANGUAGE_NOTE.to_string(),
        }
    }
}

/// Content engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_language: InitialLanguage,
}

impl EngineConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    ///
    /// ```
    /// let config = kofe_core::EngineConfig::from_json_str(
    ///     r#"{"initial_language": {"code": "POL", "name": "Polish"}}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.initial_language.code, "POL");
    /// assert_eq!(config.initial_language.note, "Initial language");
    /// ```
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_language.code.trim().is_empty() {
            return Err(ConfigError::BlankDefaultCode);
        }
        Ok(())
    }
}
