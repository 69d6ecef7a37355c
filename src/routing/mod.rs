//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     LoadedModule[] (routes in declaration order)
//!     → spec.rs (parse "VERB path")
//!     → bootstrap.rs (register, mine /api/ docs, add GET /error)
//!     → table.rs (one entry per verb + path, later wins)
//!     → Freeze as immutable axum Router
//!
//! Incoming Request (method, path)
//!     → table.rs (matchit lookup, verb selection)
//!     → handler, or 404
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Only GET and POST are routable; HEAD is answered by GET
//! - Deterministic: same input always matches same route

pub mod bootstrap;
pub mod spec;
pub mod table;

pub use bootstrap::{build_route_table, register_modules};
pub use spec::{parse, RouteSpec, RouteSpecError, Verb};
pub use table::{RegisterError, Registration, RouteEntry, RouteTable};
