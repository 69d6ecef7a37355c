//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, APP_ENV override)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at boot and never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::AppConfig;
pub use schema::DevelopmentConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PathsConfig;
pub use schema::RunMode;
pub use schema::SiteConfig;
