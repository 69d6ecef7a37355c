//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store one entry per (verb, path), replacing on collision
//! - Reject paths the HTTP engine would refuse, instead of panicking at boot
//! - Freeze into the axum router that serves requests
//!
//! # Design Decisions
//! - Immutable after boot (shared without locks)
//! - Path matching is delegated to matchit, the engine's own matcher
//! - Later registrations for the same (verb, path) win
//! - A reserved mount (the development `/static` service) owns its whole subtree

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Router,
};
use futures_util::future::BoxFuture;

use crate::handlers::BoxedHandler;
use crate::http::server::AppState;
use crate::pipeline::context::RequestContext;
use crate::pipeline::identity::CurrentUser;
use crate::pipeline::mode::ClientAddr;
use crate::pipeline::response_mode::ResponseMode;
use crate::routing::spec::{RouteSpec, Verb};

/// A handler bound to a verb and path.
#[derive(Clone)]
pub struct RouteEntry {
    pub verb: Verb,
    pub path: String,
    pub module: String,
    pub handler: BoxedHandler,
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// An earlier entry for the same (verb, path) was replaced.
    Replaced { previous_module: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("route path '{path}' conflicts with an existing route: {source}")]
    Conflict {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("route path '{path}' is taken by the {mount} mount")]
    Reserved { path: String, mount: String },
}

/// Check a path against the engine's pattern rules.
pub fn validate_path(path: &str) -> Result<(), &'static str> {
    if !path.starts_with('/') {
        return Err("path must start with '/'");
    }
    for segment in path.split('/') {
        if segment.starts_with(':') {
            return Err("captures are written {name}, not :name");
        }
        if segment.starts_with('*') {
            return Err("wildcards are written {*name}, not *name");
        }
    }
    Ok(())
}

/// The single source of truth for which handler answers which request.
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<(Verb, String), usize>,
    matcher: matchit::Router<String>,
    mounts: Vec<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `prefix` and everything below it free for a nested service.
    pub fn reserve_mount(&mut self, prefix: &str) {
        let prefix = prefix.trim_end_matches('/');
        if !self.mounts.iter().any(|m| m == prefix) {
            self.mounts.push(prefix.to_string());
        }
    }

    fn mount_for(&self, path: &str) -> Option<&str> {
        self.mounts
            .iter()
            .find(|mount| {
                path.strip_prefix(mount.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .map(String::as_str)
    }

    pub fn register(
        &mut self,
        spec: RouteSpec,
        module: &str,
        handler: BoxedHandler,
    ) -> Result<Registration, RegisterError> {
        let (verb, path) = spec.into_parts();
        validate_path(&path).map_err(|reason| RegisterError::InvalidPath {
            path: path.clone(),
            reason,
        })?;
        if let Some(mount) = self.mount_for(&path) {
            return Err(RegisterError::Reserved {
                mount: mount.to_string(),
                path,
            });
        }

        let entry = RouteEntry {
            verb,
            path: path.clone(),
            module: module.to_string(),
            handler,
        };

        if let Some(&slot) = self.index.get(&(verb, path.clone())) {
            let previous = std::mem::replace(&mut self.entries[slot], entry);
            return Ok(Registration::Replaced {
                previous_module: previous.module,
            });
        }

        if !self.has_path(&path) {
            self.matcher
                .insert(path.clone(), path.clone())
                .map_err(|source| RegisterError::Conflict {
                    path: path.clone(),
                    source,
                })?;
        }

        self.index.insert((verb, path), self.entries.len());
        self.entries.push(entry);
        Ok(Registration::Added)
    }

    fn has_path(&self, path: &str) -> bool {
        self.index.keys().any(|(_, p)| p == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Entry registered for exactly this (verb, path pattern).
    pub fn lookup(&self, verb: Verb, path: &str) -> Option<&RouteEntry> {
        self.index
            .get(&(verb, path.to_string()))
            .map(|&slot| &self.entries[slot])
    }

    /// Entry that answers a concrete request, or `None` for a 404.
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        let verb = Verb::from_method(method)?;
        let matched = self.matcher.at(path).ok()?;
        self.lookup(verb, matched.value)
    }

    /// Build the axum router serving every entry.
    pub fn to_router(&self) -> Router<AppState> {
        let mut order: Vec<&str> = Vec::new();
        let mut methods: HashMap<&str, MethodRouter<AppState>> = HashMap::new();

        for entry in &self.entries {
            let method_router = match methods.remove(entry.path.as_str()) {
                Some(existing) => existing,
                None => {
                    order.push(&entry.path);
                    MethodRouter::new()
                }
            };
            let endpoint = endpoint(entry.handler.clone());
            let method_router = match entry.verb {
                Verb::Get => method_router.get(endpoint),
                Verb::Post => method_router.post(endpoint),
            };
            methods.insert(&entry.path, method_router);
        }

        order.into_iter().fold(Router::new(), |router, path| {
            match methods.remove(path) {
                Some(method_router) => router.route(path, method_router),
                None => router,
            }
        })
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn endpoint(
    handler: BoxedHandler,
) -> impl Fn(State<AppState>, Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |State(state): State<AppState>, request: Request| {
        let handler = handler.clone();
        Box::pin(invoke(handler, state, request)) as BoxFuture<'static, Response>
    }
}

/// Build the handler context from what the pipeline attached, then run the handler.
async fn invoke(handler: BoxedHandler, state: AppState, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &state)
        .await
        .map(|Path(params)| params)
        .unwrap_or_default();
    let identity = parts
        .extensions
        .get::<CurrentUser>()
        .and_then(|user| user.0.clone());
    let mode = parts
        .extensions
        .get::<ResponseMode>()
        .cloned()
        .unwrap_or_else(|| ResponseMode::Theme(state.theme.clone()));
    let client_addr = parts.extensions.get::<ClientAddr>().and_then(|addr| addr.0);

    let ctx = RequestContext::new(
        Request::from_parts(parts, body),
        params,
        identity,
        mode,
        client_addr,
        state.renderer.clone(),
    );

    match handler.call(ctx).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
