//! Per-request middleware pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → errors.rs (panic supervisor, outermost)
//!     → request id + trace span + metrics
//!     → errors.rs (error translator, sees every stage below)
//!     → mode.rs (API jitter in development, client address)
//!     → body limit
//!     → content_type.rs (JSON for /api/)
//!     → identity.rs (attach current user)
//!     → area.rs (manage gate or theme mode)
//!     → routing table dispatch → handler (context.rs)
//! ```
//!
//! # Design Decisions
//! - Stage order is fixed; only the area gate redirect or an error ends a request early
//! - Errors travel back out as response markers, not panics
//! - Mode-specific stages are installed at boot, never toggled at runtime

pub mod area;
pub mod content_type;
pub mod context;
pub mod errors;
pub mod identity;
pub mod mode;
pub mod response_mode;
pub mod upload;

use axum::{middleware, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{RequestUuid, X_REQUEST_ID};
use crate::http::server::AppState;
use crate::observability::metrics;

pub use area::{Area, API_PREFIX, AUTH_PATH, ERROR_PATH, MANAGE_PREFIX, STATIC_PREFIX};
pub use context::RequestContext;
pub use errors::{ErrorTap, GENERIC_ERROR_BODY};
pub use identity::{Anonymous, CurrentUser, Identity, IdentityResolver, Role};
pub use response_mode::{ResponseMode, ThemeMode};

/// Wrap the dispatch router in every pipeline stage.
///
/// Layers run outermost-last-added, so they are listed innermost first.
pub fn install(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let mut router = router
        .layer(middleware::from_fn_with_state(state.clone(), area::area_gate))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity::resolve_identity,
        ))
        .layer(middleware::from_fn(content_type::api_json))
        .layer(RequestBodyLimitLayer::new(state.config.limits.max_body_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), mode::client_addr));

    if !state.config.is_production() {
        router = router.layer(middleware::from_fn_with_state(state.clone(), mode::api_jitter));
    }

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            errors::translate_errors,
        ))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), RequestUuid))
        .layer(CatchPanicLayer::custom(errors::handle_panic))
}
