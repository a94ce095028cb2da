//! # Configuration Module
//!
//! Runtime configuration for the request pipeline, loaded from environment variables
//! or a TOML document.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HELMSMAN_DEFAULT_FORMAT` | `json` | Format used when neither `Accept` nor the URL names one |
//! | `HELMSMAN_ROOT_NAME` | `response` | Root element name handed to writers |
//! | `HELMSMAN_DATA_KEY` | `data` | Body key for plain endpoint return values |
//! | `HELMSMAN_TEXT_KEY` | `text` | Parameter holding a body no reader could decode |
//!
//! ## TOML
//!
//! ```toml
//! default_format = "yaml"
//! root_name = "api"
//! ```
//!
//! Missing keys keep their defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Request pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Last-resort response format
    pub default_format: String,
    /// Root element name passed to writers
    pub root_name: String,
    /// Body key for plain return values and empty-keyed entries
    pub data_key: String,
    /// Parameter name for an undecodable request body
    pub text_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_format: "json".to_string(),
            root_name: "response".to_string(),
            data_key: "data".to_string(),
            text_key: "text".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, fallback: String| {
            env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            default_format: var("HELMSMAN_DEFAULT_FORMAT", defaults.default_format).to_lowercase(),
            root_name: var("HELMSMAN_ROOT_NAME", defaults.root_name),
            data_key: var("HELMSMAN_DATA_KEY", defaults.data_key),
            text_key: var("HELMSMAN_TEXT_KEY", defaults.text_key),
        }
    }

    /// Parse configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has mistyped keys.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse API configuration")
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}
