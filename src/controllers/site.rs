//! Public site information API.

use serde_json::json;

use crate::error::HandlerResult;
use crate::handler_module;
use crate::handlers::{FnModule, RouteDef};
use crate::pipeline::{RequestContext, ResponseMode};

async fn site_info(ctx: RequestContext) -> HandlerResult {
    match ctx.mode() {
        ResponseMode::Theme(theme) => ctx.json(&json!({
            "name": theme.site().name,
            "description": theme.site().description,
        })),
        ResponseMode::Manage => ctx.json(&json!({})),
    }
}

fn routes() -> Vec<RouteDef> {
    vec![RouteDef::get("/api/site", site_info)
        .with_doc("Get public site information.\n\n@return {object} name and description.")]
}

pub const MODULE: FnModule = handler_module!(routes);
