//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Production or development behaviour, fixed for the process lifetime.
    pub environment: RunMode,

    /// Active theme name; views resolve under `themes/<theme>/`.
    pub theme: String,

    /// Site metadata exposed to themed views.
    pub site: SiteConfig,

    /// Filesystem locations used by the pipeline.
    pub paths: PathsConfig,

    /// Settings that only apply outside production.
    pub development: DevelopmentConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            environment: RunMode::default(),
            theme: "default".to_string(),
            site: SiteConfig::default(),
            paths: PathsConfig::default(),
            development: DevelopmentConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Whether the process runs in production mode.
    pub fn is_production(&self) -> bool {
        self.environment == RunMode::Production
    }
}

/// Process-wide environment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Production,
    #[default]
    Development,
}

impl RunMode {
    /// Interpret an environment setting such as `APP_ENV`.
    ///
    /// Only the exact value `production` selects production mode.
    pub fn from_setting(value: &str) -> Self {
        if value == "production" {
            RunMode::Production
        } else {
            RunMode::Development
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Site metadata placed into every themed render model as `__website__`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    pub custom_header: String,
    pub custom_footer: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Website Name".to_string(),
            description: "website blablabla...".to_string(),
            custom_header: String::new(),
            custom_footer: String::new(),
        }
    }
}

/// Filesystem paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory of view templates.
    pub views_dir: String,

    /// Directory served under `/static` in development mode.
    pub static_dir: String,

    /// Scratch directory for multipart uploads.
    pub upload_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            views_dir: "views".to_string(),
            static_dir: "static".to_string(),
            upload_dir: "/tmp/itranswarp".to_string(),
        }
    }
}

/// Development-only behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    /// Upper bound (exclusive) of the random delay added to `/api/` requests.
    /// Zero disables the delay.
    pub api_jitter_ms: u64,
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self { api_jitter_ms: 50 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
