//! Identity resolution stage.
//!
//! # Responsibilities
//! - Ask the identity collaborator who is calling
//! - Attach the (possibly absent) identity to the request before the area gate
//!
//! # Design Decisions
//! - Resolution failures become pipeline errors, not anonymous requests
//! - Roles are ordered integers; lower means more privileged

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::http::server::AppState;

/// Privilege level. Lower values are more privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub u32);

impl Role {
    pub const ADMIN: Role = Role(0);
    pub const EDITOR: Role = Role(10);
    pub const CONTRIBUTOR: Role = Role(100);
    pub const SUBSCRIBER: Role = Role(1000);
    pub const GUEST: Role = Role(10_000_000);

    /// Whether this role is allowed into the manage area.
    pub fn can_manage(self) -> bool {
        self <= Role::CONTRIBUTOR
    }
}

/// The resolved caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// Request extension set by [`resolve_identity`].
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Identity collaborator, e.g. a session cookie parser.
pub trait IdentityResolver: Send + Sync {
    fn resolve<'a>(&'a self, parts: &'a Parts) -> BoxFuture<'a, Result<Option<Identity>, AppError>>;
}

/// Resolver that treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityResolver for Anonymous {
    fn resolve<'a>(&'a self, _parts: &'a Parts) -> BoxFuture<'a, Result<Option<Identity>, AppError>> {
        Box::pin(async { Ok(None) })
    }
}

pub async fn resolve_identity(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let identity = match state.identity.resolve(&parts).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Identity resolution failed");
            return e.into_response();
        }
    };

    if let Some(user) = &identity {
        tracing::debug!(user = %user.id, role = user.role.0, "Resolved identity");
    }

    parts.extensions.insert(CurrentUser(identity));
    next.run(Request::from_parts(parts, body)).await
}
