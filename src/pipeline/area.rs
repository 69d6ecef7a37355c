//! Area gate.
//!
//! # Responsibilities
//! - Classify each request by its first path segment
//! - Keep the manage area to identities at or above contributor privilege
//! - Hand the matching response mode to the handler
//!
//! # Design Decisions
//! - Only the exact `/manage/` prefix is the manage area
//! - Denied requests are redirected, never raised as errors
//! - Every other request, API included, gets the theme mode

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::pipeline::identity::{CurrentUser, Identity};
use crate::pipeline::response_mode::ResponseMode;

/// Machine-readable endpoints.
pub const API_PREFIX: &str = "/api/";
/// Privileged administrative area.
pub const MANAGE_PREFIX: &str = "/manage/";
/// Where denied manage requests are sent.
pub const AUTH_PATH: &str = "/auth/";
/// Diagnostic route that always fails.
pub const ERROR_PATH: &str = "/error";
/// Static assets mount (development only).
pub const STATIC_PREFIX: &str = "/static";

/// Path-defined zone of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Manage,
    Theme,
}

impl Area {
    pub fn of(path: &str) -> Self {
        if path.starts_with(MANAGE_PREFIX) {
            Area::Manage
        } else {
            Area::Theme
        }
    }
}

/// Whether `identity` may enter the manage area.
pub fn can_enter_manage(identity: Option<&Identity>) -> bool {
    identity.is_some_and(|user| user.role.can_manage())
}

/// `302 Found` to the authentication entry point.
pub fn redirect_to_auth() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, AUTH_PATH)]).into_response()
}

pub async fn area_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .unwrap_or_default();

    let mode = match Area::of(request.uri().path()) {
        Area::Manage => {
            if !can_enter_manage(user.identity()) {
                tracing::info!(
                    path = %request.uri().path(),
                    user = ?user.identity().map(|u| &u.id),
                    "Manage area denied, redirecting to auth"
                );
                return redirect_to_auth();
            }
            ResponseMode::Manage
        }
        Area::Theme => ResponseMode::Theme(state.theme.clone()),
    };

    request.extensions_mut().insert(mode);
    next.run(request).await
}
