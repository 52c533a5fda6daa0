//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DumpConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DumpConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DumpConfig, ConfigError> {
    let config: DumpConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), DumpConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = parse_config(
            r#"
            watch = true

            [render]
            pretty = false

            [tap]
            upstream_address = "10.1.2.3:8000"
            "#,
        )
        .unwrap();

        assert!(config.watch);
        assert!(!config.render.pretty);
        assert_eq!(config.tap.upstream_address, "10.1.2.3:8000");
        assert_eq!(config.tap.bind_address, "127.0.0.1:8080");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[render]\npretty = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[tap]\nmax_connections = 0\ntee_buffer_bytes = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: tap.max_connections must be greater than zero, \
             tap.tee_buffer_bytes must be greater than zero"
        );
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("httpdump-config-{}.toml", std::process::id()));
        fs::write(&path, "[output]\npath = \"/tmp/httpdump.log\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output.path, "/tmp/httpdump.log");

        let _ = fs::remove_file(&path);
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
