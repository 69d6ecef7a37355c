//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (boot, Axum setup, graceful shutdown)
//!     → request.rs (request ID generation and propagation)
//!     → pipeline (mode, identity, area gate, error translation)
//!     → routing table → handler
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdExt, RequestUuid, X_REQUEST_ID};
pub use server::{AppServer, AppServerBuilder, AppState, BootError};
