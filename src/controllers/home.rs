//! Theme home page.

use serde_json::json;

use crate::error::HandlerResult;
use crate::handler_module;
use crate::handlers::{FnModule, RouteDef};
use crate::pipeline::RequestContext;

async fn index(ctx: RequestContext) -> HandlerResult {
    ctx.render("index.html", json!({ "title": "Home" }))
}

fn routes() -> Vec<RouteDef> {
    vec![RouteDef::new("GET /", index)]
}

pub const MODULE: FnModule = handler_module!(routes);
