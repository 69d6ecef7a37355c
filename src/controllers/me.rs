//! Current-user API.

use crate::error::{ApiError, HandlerResult};
use crate::handler_module;
use crate::handlers::{FnModule, RouteDef};
use crate::pipeline::RequestContext;

/**
 * Get the signed-in user.
 *
 * @return {object} The user: id, name and role.
 * @error {signin:required} No user is signed in.
 */
async fn current_user(ctx: RequestContext) -> HandlerResult {
    match ctx.identity() {
        Some(user) => ctx.json(user),
        None => Err(ApiError::new("signin:required", "", "Please sign in first.")
            .with_status(axum::http::StatusCode::UNAUTHORIZED)
            .into()),
    }
}

fn routes() -> Vec<RouteDef> {
    vec![RouteDef::get("/api/me", current_user).with_source(include_str!("me.rs"))]
}

pub const MODULE: FnModule = handler_module!(routes);
