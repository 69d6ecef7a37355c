//! API documentation extraction.
//!
//! # Data Flow
//! ```text
//! RouteDef doc (explicit text, or handler source)
//!     → extractor.rs (first block comment of the source)
//!     → collector.rs (ApiDocEntry into the ApiDocIndex)
//!     → external tooling (api console, itranswarp-cli api-docs)
//! ```
//!
//! # Design Decisions
//! - Only routes under `/api/` are documented
//! - Missing docs are a warning, never a registration failure
//! - Doc contents are opaque and forwarded verbatim

pub mod collector;
pub mod extractor;

pub use collector::{ApiDocEntry, ApiDocIndex, DocCollector};
pub use extractor::extract;
