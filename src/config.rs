//! Client configuration.
//!
//! The host page may pass a JSON object to the wasm entry point; every field
//! is optional and falls back to a default. Nothing is persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::{default_base_url, normalize_base_url};
use crate::model::{DEFAULT_LABEL, Label, default_labels};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's Level (used by console_log).
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }
}

/// Errors in a supplied configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Label palette is empty
    #[error("At least one label is required")]
    NoLabels,

    /// Default label is not part of the palette
    #[error("Default label '{label}' is not in the label list")]
    UnknownDefaultLabel {
        /// The offending label
        label: String,
    },

    /// Backend URL is not http(s)
    #[error("Invalid backend URL '{url}'")]
    InvalidBackendUrl {
        /// The offending URL
        url: String,
    },

    /// Export extension is empty or contains a path separator
    #[error("Invalid export extension '{extension}'")]
    InvalidExtension {
        /// The offending extension
        extension: String,
    },
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL; `None` means `http://{page host}:8001`
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Label palette offered as buttons
    #[serde(default = "default_label_names")]
    pub labels: Vec<String>,

    /// Label active at start
    #[serde(default = "default_label_name")]
    pub default_label: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Extension of downloaded export files
    #[serde(default = "default_export_extension")]
    pub export_extension: String,
}

fn default_label_names() -> Vec<String> {
    default_labels()
        .into_iter()
        .map(|l| l.as_str().to_string())
        .collect()
}

fn default_label_name() -> String {
    DEFAULT_LABEL.to_string()
}

fn default_export_extension() -> String {
    "conll".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            labels: default_label_names(),
            default_label: default_label_name(),
            log_level: LogLevel::default(),
            export_extension: default_export_extension(),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.is_empty() {
            return Err(ConfigError::NoLabels);
        }
        if !self.labels.contains(&self.default_label) {
            return Err(ConfigError::UnknownDefaultLabel {
                label: self.default_label.clone(),
            });
        }
        if let Some(url) = &self.backend_url {
            if normalize_base_url(url).is_none() {
                return Err(ConfigError::InvalidBackendUrl { url: url.clone() });
            }
        }
        let ext = &self.export_extension;
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            return Err(ConfigError::InvalidExtension {
                extension: ext.clone(),
            });
        }
        Ok(())
    }

    /// Label palette.
    pub fn labels(&self) -> Vec<Label> {
        self.labels.iter().map(|l| Label::new(l.as_str())).collect()
    }

    /// Label active at start.
    pub fn default_label(&self) -> Label {
        Label::new(self.default_label.as_str())
    }

    /// Backend URL to use for a page served from `hostname`.
    pub fn backend_url_for(&self, hostname: &str) -> String {
        self.backend_url
            .as_deref()
            .and_then(normalize_base_url)
            .unwrap_or_else(|| default_base_url(hostname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_label(), Label::new("PERS"));
        assert_eq!(config.export_extension, "conll");
        assert_eq!(config.backend_url_for("annot.local"), "http://annot.local:8001");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_custom_labels_and_url() {
        let config = ClientConfig::from_json(
            r#"{"labels":["PER","GPE"],"default_label":"GPE","backend_url":"https://api.example/","log_level":"debug"}"#,
        )
        .unwrap();
        assert_eq!(config.labels(), vec![Label::new("PER"), Label::new("GPE")]);
        assert_eq!(config.backend_url_for("ignored"), "https://api.example");
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_default_label_must_be_in_palette() {
        let err = ClientConfig::from_json(r#"{"labels":["LOC"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefaultLabel { .. }));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            ClientConfig::from_json(r#"{"labels":[]}"#),
            Err(ConfigError::NoLabels)
        ));
        assert!(matches!(
            ClientConfig::from_json(r#"{"backend_url":"localhost:8001"}"#),
            Err(ConfigError::InvalidBackendUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::from_json(r#"{"export_extension":"../x"}"#),
            Err(ConfigError::InvalidExtension { .. })
        ));
        assert!(matches!(
            ClientConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::default().name(), "Info");
        assert_eq!(LogLevel::Trace.to_level(), log::Level::Trace);
    }
}
