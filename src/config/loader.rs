//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{AppConfig, RunMode};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "ITRANSWARP_CONFIG";

/// Environment variable selecting the run mode (`production` or anything else).
pub const RUN_MODE_ENV: &str = "APP_ENV";

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the process configuration once at boot.
///
/// `ITRANSWARP_CONFIG` names the file; otherwise `config.toml` is used when
/// present, else built-in defaults. `APP_ENV` then overrides the run mode.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    let mut config = match env::var_os(CONFIG_PATH_ENV) {
        Some(path) => load_config(Path::new(&path))?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            load_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => AppConfig::default(),
    };

    if let Ok(mode) = env::var(RUN_MODE_ENV) {
        config.environment = RunMode::from_setting(&mode);
    }

    Ok(config)
}
