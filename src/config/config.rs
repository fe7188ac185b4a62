//! Connector configuration
//!
//! Loaded from a TOML file and validated into a [`RuntimeConfig`].
//!
//! ```toml
//! service_uri = "https://example.com/Northwind.svc"
//! naming_format = "invert-first-letter"
//! format = "json"
//! version = "V2"
//!
//! [headers]
//! sap-client = "100"
//! ```

use crate::mapping::DEFAULT_MAX_DEPTH;
use crate::naming::NamingFormat;
use crate::odata::{FormatType, ODataVersion};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the config file path
pub const CONFIG_ENV_VAR: &str = "ODATA_CONNECTOR_CONFIG";

/// Config file used when the environment variable is unset
pub const DEFAULT_CONFIG_FILE: &str = "odata-connector.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Raw configuration as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_uri: Option<String>,
    pub naming_format: NamingFormat,
    pub format: FormatType,
    pub version: ODataVersion,
    pub timeout_secs: Option<u64>,
    pub max_depth: Option<usize>,
    pub headers: BTreeMap<String, String>,
}

/// Validated settings used by the connector
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Service root, always ending with `/`
    pub service_uri: String,
    pub naming_format: NamingFormat,
    pub format: FormatType,
    pub version: ODataVersion,
    pub timeout: Duration,
    pub max_depth: usize,
    pub headers: BTreeMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_uri: String::new(),
            naming_format: NamingFormat::default(),
            format: FormatType::default(),
            version: ODataVersion::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_depth: DEFAULT_MAX_DEPTH,
            headers: BTreeMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Settings for a service root with everything else defaulted
    pub fn for_service(service_uri: impl Into<String>) -> Self {
        Self {
            service_uri: normalize_uri(service_uri.into()),
            ..Self::default()
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml(&content)
    }

    /// Load from `$ODATA_CONNECTOR_CONFIG`, falling back to `odata-connector.toml`
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate and convert to runtime settings
    pub fn to_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        let service_uri = self
            .service_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or(ConfigError::Missing("service_uri"))?;

        if !(service_uri.starts_with("http://") || service_uri.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "service_uri",
                reason: format!("expected an http(s) URL, got '{}'", service_uri),
            });
        }

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        let max_depth = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(ConfigError::Invalid {
                name: "max_depth",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(RuntimeConfig {
            service_uri: normalize_uri(service_uri.to_string()),
            naming_format: self.naming_format,
            format: self.format,
            version: self.version,
            timeout: Duration::from_secs(timeout_secs),
            max_depth,
            headers: self.headers.clone(),
        })
    }
}

fn normalize_uri(uri: String) -> String {
    if uri.ends_with('/') {
        uri
    } else {
        format!("{}/", uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_toml("service_uri = \"https://example.com/svc.svc\"").unwrap();
        let runtime = config.to_runtime().unwrap();

        assert_eq!(runtime.service_uri, "https://example.com/svc.svc/");
        assert_eq!(runtime.naming_format, NamingFormat::Identity);
        assert_eq!(runtime.format, FormatType::Json);
        assert_eq!(runtime.version, ODataVersion::V2);
        assert_eq!(runtime.timeout, Duration::from_secs(120));
        assert_eq!(runtime.max_depth, DEFAULT_MAX_DEPTH);
        assert!(runtime.headers.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            service_uri = "https://example.com/svc.svc/"
            naming_format = "invert-first-letter"
            format = "atom"
            version = "V1"
            timeout_secs = 30
            max_depth = 8

            [headers]
            sap-client = "100"
            "#,
        )
        .unwrap();
        let runtime = config.to_runtime().unwrap();

        assert_eq!(runtime.naming_format, NamingFormat::InvertFirstLetter);
        assert_eq!(runtime.format, FormatType::Atom);
        assert_eq!(runtime.version, ODataVersion::V1);
        assert_eq!(runtime.timeout, Duration::from_secs(30));
        assert_eq!(runtime.max_depth, 8);
        assert_eq!(runtime.headers.get("sap-client").map(String::as_str), Some("100"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            Config::default().to_runtime(),
            Err(ConfigError::Missing("service_uri"))
        ));

        let config = Config::from_toml("service_uri = \"ftp://example.com\"").unwrap();
        assert!(matches!(
            config.to_runtime(),
            Err(ConfigError::Invalid { name: "service_uri", .. })
        ));

        let config =
            Config::from_toml("service_uri = \"https://example.com\"\ntimeout_secs = 0").unwrap();
        assert!(matches!(
            config.to_runtime(),
            Err(ConfigError::Invalid { name: "timeout_secs", .. })
        ));
    }

    #[test]
    fn test_unknown_naming_format_rejected() {
        let result = Config::from_toml(
            "service_uri = \"https://example.com\"\nnaming_format = \"shouting\"",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/odata-connector.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_for_service() {
        let runtime = RuntimeConfig::for_service("https://example.com/svc.svc");
        assert_eq!(runtime.service_uri, "https://example.com/svc.svc/");
        assert_eq!(runtime.version, ODataVersion::V2);
    }
}
