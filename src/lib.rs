//! itranswarp request-dispatch core.
//!
//! # Architecture Overview
//!
//! ```text
//!     Boot:
//!       config ─▶ upload dir ─▶ handler modules ─▶ route table + api docs ─▶ listener
//!
//!     Request:
//!       client ─▶ request id / trace / metrics
//!              ─▶ error translator
//!              ─▶ run mode stages (dev jitter, client address)
//!              ─▶ JSON content type for /api/
//!              ─▶ identity ─▶ area gate (/manage/ or theme)
//!              ─▶ route table ─▶ handler ─▶ response
//! ```
//!
//! Handler modules live under [`controllers`]; each exports routes keyed by
//! `"VERB path"`. The route table is built once and never changes.

// Core subsystems
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod routing;

// Request handling
pub mod docs;
pub mod pipeline;
pub mod render;

// Built-in modules
pub mod controllers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use error::{ApiError, AppError, HandlerResult};
pub use http::{AppServer, AppState};
pub use lifecycle::Shutdown;
