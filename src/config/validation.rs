//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and formats (bind address, theme name, paths)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("theme '{0}' must be a single non-empty path segment")]
    Theme(String),

    #[error("paths.{field} must not be empty")]
    EmptyPath { field: &'static str },

    #[error("limits.max_body_bytes must be greater than zero")]
    BodyLimit,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let theme = config.theme.as_str();
    if theme.is_empty() || theme.contains('/') || theme.contains('\\') || theme == ".." {
        errors.push(ValidationError::Theme(config.theme.clone()));
    }

    for (field, value) in [
        ("views_dir", &config.paths.views_dir),
        ("static_dir", &config.paths.static_dir),
        ("upload_dir", &config.paths.upload_dir),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyPath { field });
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
