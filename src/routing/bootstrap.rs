//! Boot-time route registration.
//!
//! # Responsibilities
//! - Parse every module route key and register it in the table
//! - Collect API docs for routes under `/api/`
//! - Append the built-in `GET /error` diagnostic route
//!
//! # Design Decisions
//! - A bad route is logged and skipped; boot never fails on one
//! - Collisions keep the later registration and log a warning
//! - A replaced `/api/` route keeps only the doc of its replacement

use std::sync::Arc;

use crate::docs::{extract, ApiDocEntry, DocCollector};
use crate::error::{AppError, HandlerResult};
use crate::handlers::{LoadedModule, RouteDef, RouteDoc};
use crate::pipeline::area::{API_PREFIX, ERROR_PATH};
use crate::pipeline::context::RequestContext;
use crate::routing::spec::{RouteSpec, Verb};
use crate::routing::table::{Registration, RouteTable};

/// Module name the built-in routes are registered under.
pub const CORE_MODULE: &str = "app";

/// Message raised by the diagnostic route.
pub const TEST_ERROR_MESSAGE: &str = "test error.";

async fn test_error(_ctx: RequestContext) -> HandlerResult {
    Err(AppError::internal(TEST_ERROR_MESSAGE))
}

/// Register every route of `modules`, in order, then the built-in routes.
pub fn build_route_table(modules: &[LoadedModule], docs: &mut dyn DocCollector) -> RouteTable {
    register_modules(RouteTable::new(), modules, docs)
}

/// Like [`build_route_table`], starting from a table with mounts already reserved.
pub fn register_modules(
    mut table: RouteTable,
    modules: &[LoadedModule],
    docs: &mut dyn DocCollector,
) -> RouteTable {
    let mut skipped = 0usize;

    for module in modules {
        for def in &module.routes {
            if !register_route(&mut table, &module.name, def, docs) {
                skipped += 1;
            }
        }
    }

    register_builtin(&mut table);
    tracing::info!(routes = table.len(), skipped, "Route table ready");
    table
}

/// Register one route; `false` when it was skipped.
fn register_route(
    table: &mut RouteTable,
    module: &str,
    def: &RouteDef,
    docs: &mut dyn DocCollector,
) -> bool {
    let spec = match def.key().resolve() {
        Ok(spec) => spec,
        Err(e) => {
            tracing::warn!(module = %module, error = %e, "Skipping route");
            return false;
        }
    };

    match table.register(spec.clone(), module, def.handler().clone()) {
        Ok(Registration::Added) => {
            tracing::info!("found: {} {} in {}.rs", spec.verb(), spec.path(), module);
        }
        Ok(Registration::Replaced { previous_module }) => {
            tracing::info!("found: {} {} in {}.rs", spec.verb(), spec.path(), module);
            tracing::warn!(
                route = %spec,
                previous = %previous_module,
                current = %module,
                "Route registered twice, later registration wins"
            );
            docs.discard_api_doc(spec.verb(), spec.path());
        }
        Err(e) => {
            tracing::warn!(module = %module, error = %e, "Skipping route");
            return false;
        }
    }

    if spec.path().starts_with(API_PREFIX) {
        collect_doc(module, &spec, def.doc(), docs);
    }
    true
}

/// Hand the route's doc to the collector; `false` when none was found.
pub fn collect_doc(
    module: &str,
    spec: &RouteSpec,
    doc: Option<&RouteDoc>,
    docs: &mut dyn DocCollector,
) -> bool {
    let text = match doc {
        Some(RouteDoc::Text(text)) => Some(text.to_string()),
        Some(RouteDoc::Source(source)) => extract(source),
        None => None,
    };

    match text {
        Some(doc) => {
            docs.process_api_doc(ApiDocEntry {
                module: module.to_string(),
                verb: spec.verb(),
                route: spec.path().to_string(),
                doc,
            });
            true
        }
        None => {
            tracing::warn!(module = %module, route = %spec, "No api docs found for api");
            false
        }
    }
}

fn register_builtin(table: &mut RouteTable) {
    let result = RouteSpec::new(Verb::Get, ERROR_PATH)
        .map_err(|e| e.to_string())
        .and_then(|spec| {
            table
                .register(spec, CORE_MODULE, Arc::new(test_error))
                .map_err(|e| e.to_string())
        });
    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to register diagnostic route");
    }
}
