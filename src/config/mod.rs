//! Configuration module

pub mod config;

pub use config::{Config, ConfigError, RuntimeConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
