//! Handler module contract.
//!
//! # Data Flow
//! ```text
//! HandlerModule (one per source file)
//!     → routes() yields RouteDef { key, handler, doc }
//!     → registry.rs (discover names, load routes in order)
//!     → routing::bootstrap (parse keys, register, mine docs)
//! ```
//!
//! # Design Decisions
//! - Modules are registered explicitly at startup instead of scanned from disk
//! - A module's name still comes from its source filename
//! - Route keys may be typed or the external `"VERB path"` string

pub mod registry;

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::HandlerResult;
use crate::pipeline::context::RequestContext;
use crate::routing::spec::{RouteSpec, RouteSpecError, Verb};

pub use registry::{module_name, LoadedModule, ModuleRegistry};

/// A request handler bound to a route.
pub trait RouteHandler: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(ctx))
    }
}

/// Shared handler pointer stored in the route table.
pub type BoxedHandler = Arc<dyn RouteHandler>;

/// How a route names its verb and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKey {
    /// External string form, validated at registration.
    Raw(String),
    /// Built directly by the module.
    Typed(RouteSpec),
}

impl RouteKey {
    pub fn resolve(&self) -> Result<RouteSpec, RouteSpecError> {
        match self {
            RouteKey::Raw(raw) => crate::routing::spec::parse(raw),
            RouteKey::Typed(spec) => Ok(spec.clone()),
        }
    }
}

/// Documentation attached to a route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDoc {
    /// Handler source text; the first block comment is the doc.
    Source(Cow<'static, str>),
    /// Doc text given verbatim.
    Text(Cow<'static, str>),
}

/// One route exported by a handler module.
#[derive(Clone)]
pub struct RouteDef {
    key: RouteKey,
    handler: BoxedHandler,
    doc: Option<RouteDoc>,
}

impl RouteDef {
    /// Declare a route from its `"VERB path"` string.
    pub fn new(spec: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self {
            key: RouteKey::Raw(spec.into()),
            handler: Arc::new(handler),
            doc: None,
        }
    }

    /// Declare a route from an already validated spec.
    pub fn typed(spec: RouteSpec, handler: impl RouteHandler) -> Self {
        Self {
            key: RouteKey::Typed(spec),
            handler: Arc::new(handler),
            doc: None,
        }
    }

    /// `GET path`. An invalid path is kept as a raw key so registration
    /// reports and skips it like any other malformed spec.
    pub fn get(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::with_verb(Verb::Get, path.into(), handler)
    }

    /// `POST path`.
    pub fn post(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::with_verb(Verb::Post, path.into(), handler)
    }

    fn with_verb(verb: Verb, path: String, handler: impl RouteHandler) -> Self {
        match RouteSpec::new(verb, path.clone()) {
            Ok(spec) => Self::typed(spec, handler),
            Err(_) => Self::new(format!("{verb} {path}"), handler),
        }
    }

    /// Attach the handler's source text for doc scraping.
    pub fn with_source(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.doc = Some(RouteDoc::Source(source.into()));
        self
    }

    /// Attach doc text directly.
    pub fn with_doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.doc = Some(RouteDoc::Text(doc.into()));
        self
    }

    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    pub fn doc(&self) -> Option<&RouteDoc> {
        self.doc.as_ref()
    }
}

impl std::fmt::Debug for RouteDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDef")
            .field("key", &self.key)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// A source file that contributes routes.
pub trait HandlerModule: Send + Sync {
    /// Path of the module's source file; its filename names the module.
    fn file(&self) -> &str;

    /// Routes in declaration order.
    fn routes(&self) -> Vec<RouteDef>;
}

/// A handler module backed by a plain function.
pub struct FnModule {
    file: &'static str,
    routes: fn() -> Vec<RouteDef>,
}

impl FnModule {
    pub const fn new(file: &'static str, routes: fn() -> Vec<RouteDef>) -> Self {
        Self { file, routes }
    }
}

impl HandlerModule for FnModule {
    fn file(&self) -> &str {
        self.file
    }

    fn routes(&self) -> Vec<RouteDef> {
        (self.routes)()
    }
}

/// Declare the current source file as a handler module.
///
/// ```ignore
/// fn routes() -> Vec<RouteDef> { vec![RouteDef::get("/", index)] }
/// pub const MODULE: FnModule = handler_module!(routes);
/// ```
#[macro_export]
macro_rules! handler_module {
    ($routes:path) => {
        $crate::handlers::FnModule::new(file!(), $routes)
    };
}
