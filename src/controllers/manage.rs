//! Management console entry page.

use serde_json::json;

use crate::error::HandlerResult;
use crate::handler_module;
use crate::handlers::{FnModule, RouteDef};
use crate::pipeline::RequestContext;

async fn dashboard(ctx: RequestContext) -> HandlerResult {
    ctx.render("manage/index.html", json!({ "title": "Dashboard" }))
}

fn routes() -> Vec<RouteDef> {
    vec![RouteDef::get("/manage/", dashboard)]
}

pub const MODULE: FnModule = handler_module!(routes);
