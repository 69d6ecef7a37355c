//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (http::server):
//!     Load config → Validate → Upload dir → Modules → Route table → Listen
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listeners
//! - Ordered shutdown: stop accept, drain, close

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
