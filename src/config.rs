//! Configuration for the hello servers.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values. Each binary
//! supplies its own default listen address, so the async and gateway
//! variants keep their traditional defaults.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments shared by both server binaries
#[derive(Parser, Debug)]
#[command(name = "hello-http")]
#[command(version = "0.1.0")]
#[command(about = "A minimal Hello, World! HTTP server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 127.0.0.1:8000)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize, Default)]
pub struct ServerConfig {
    /// Address to bind to
    pub listen: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    ///
    /// CLI arguments take precedence over TOML file values; `default_listen`
    /// fills in when neither supplies an address.
    pub fn load(default_listen: &str) -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();
        Self::resolve(cli, default_listen)
    }

    fn resolve(cli: CliArgs, default_listen: &str) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Config {
            listen: cli
                .listen
                .or(toml_config.server.listen)
                .unwrap_or_else(|| default_listen.to_string()),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_defaults() -> CliArgs {
        CliArgs {
            config: None,
            listen: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::resolve(cli_defaults(), "127.0.0.1:8000").unwrap();
        assert_eq!(config.listen, "127.0.0.1:8000");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_overrides_default() {
        let cli = CliArgs {
            listen: Some("0.0.0.0:9000".to_string()),
            log_level: "debug".to_string(),
            ..cli_defaults()
        };
        let config = Config::resolve(cli, "127.0.0.1:8000").unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen = "0.0.0.0:8000"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.as_deref(), Some("0.0.0.0:8000"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_toml_falls_back() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, None);
        assert_eq!(config.logging.level, "info");
    }
}
