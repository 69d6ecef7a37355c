//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Run the boot sequence: upload dir, renderer mode, modules, route table
//! - Create the Axum Router with the request pipeline around it
//! - Serve static files in development
//! - Bind server to listener with graceful shutdown
//!
//! # Design Decisions
//! - Everything request handling needs is built before the first accept
//! - Collaborators (identity, renderer, error tap) are injected through the builder

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::docs::ApiDocIndex;
use crate::handlers::ModuleRegistry;
use crate::pipeline::{
    self,
    errors::{ErrorTap, SharedErrorTap},
    identity::{Anonymous, IdentityResolver},
    mode::apply_boot_mode,
    response_mode::ThemeMode,
    upload::ensure_upload_dir,
    STATIC_PREFIX,
};
use crate::render::{MiniJinjaRenderer, TemplateRenderer};
use crate::routing::{register_modules, RouteTable};

/// Application state injected into middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub theme: Arc<ThemeMode>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub identity: Arc<dyn IdentityResolver>,
    pub error_tap: Option<SharedErrorTap>,
    pub api_docs: Arc<ApiDocIndex>,
}

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("failed to create upload dir {path}: {source}")]
    UploadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builder for [`AppServer`].
pub struct AppServerBuilder {
    config: AppConfig,
    modules: ModuleRegistry,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    identity: Arc<dyn IdentityResolver>,
    error_tap: Option<SharedErrorTap>,
}

impl AppServerBuilder {
    pub fn modules(mut self, modules: ModuleRegistry) -> Self {
        self.modules = modules;
        self
    }

    /// Replace the default minijinja renderer over `paths.views_dir`.
    pub fn renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn identity(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.identity = resolver;
        self
    }

    pub fn error_tap(mut self, tap: impl ErrorTap + 'static) -> Self {
        self.error_tap = Some(Arc::new(tap));
        self
    }

    pub fn build(self) -> Result<AppServer, BootError> {
        let config = Arc::new(self.config);

        let upload_dir = Path::new(&config.paths.upload_dir);
        ensure_upload_dir(upload_dir).map_err(|source| BootError::UploadDir {
            path: upload_dir.to_path_buf(),
            source,
        })?;

        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(MiniJinjaRenderer::new(&config.paths.views_dir)),
        };
        apply_boot_mode(&config, renderer.as_ref());

        let loaded = self.modules.load_all();
        let mut api_docs = ApiDocIndex::new();
        let mut table = RouteTable::new();
        if !config.is_production() {
            table.reserve_mount(STATIC_PREFIX);
        }
        let routes = register_modules(table, &loaded, &mut api_docs);

        let state = AppState {
            theme: Arc::new(ThemeMode::new(&config.theme, config.site.clone())),
            config: config.clone(),
            renderer,
            identity: self.identity,
            error_tap: self.error_tap,
            api_docs: Arc::new(api_docs),
        };

        let mut router = routes.to_router();
        if !config.is_production() {
            router = router.nest_service(STATIC_PREFIX, ServeDir::new(&config.paths.static_dir));
        }
        let router = pipeline::install(router.fallback(not_found), &state).with_state(state.clone());

        Ok(AppServer {
            router,
            state,
            routes: Arc::new(routes),
        })
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// The booted application.
pub struct AppServer {
    router: Router,
    state: AppState,
    routes: Arc<RouteTable>,
}

impl AppServer {
    pub fn builder(config: AppConfig) -> AppServerBuilder {
        AppServerBuilder {
            config,
            modules: ModuleRegistry::new(),
            renderer: None,
            identity: Arc::new(Anonymous),
            error_tap: None,
        }
    }

    /// The fully layered router, for serving or `oneshot` tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn api_docs(&self) -> &ApiDocIndex {
        &self.state.api_docs
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = ?self.state.config.environment,
            routes = self.routes.len(),
            "Start app"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, HandlerResult};
    use crate::handlers::{FnModule, RouteDef};
    use crate::pipeline::context::RequestContext;
    use crate::routing::Verb;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct NullRenderer;

    impl TemplateRenderer for NullRenderer {
        fn render(&self, view: &str, _model: &Value) -> Result<String, AppError> {
            Ok(view.to_string())
        }

        fn set_cache(&self, _enabled: bool) {}
    }

    fn config(upload_dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.paths.upload_dir = upload_dir.to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_build_creates_upload_dir_and_error_route() {
        let dir = std::env::temp_dir().join(format!("itranswarp-boot-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let server = AppServer::builder(config(&dir))
            .renderer(Arc::new(NullRenderer))
            .build()
            .unwrap();

        assert!(dir.is_dir());
        assert_eq!(server.routes().len(), 1);
        assert!(server.api_docs().is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_build_fails_when_upload_dir_blocked() {
        let file = std::env::temp_dir().join(format!("itranswarp-boot-file-{}", std::process::id()));
        std::fs::write(&file, b"x").unwrap();

        let result = AppServer::builder(config(&file))
            .renderer(Arc::new(NullRenderer))
            .build();

        assert!(matches!(result, Err(BootError::UploadDir { .. })));
        std::fs::remove_file(&file).unwrap();
    }

    async fn ok(_ctx: RequestContext) -> HandlerResult {
        Ok("ok".into_response())
    }

    fn assets() -> Vec<RouteDef> {
        vec![
            RouteDef::new("GET /static", ok),
            RouteDef::new("GET /static/{*file}", ok),
            RouteDef::new("GET /assets", ok),
        ]
    }

    #[tokio::test]
    async fn test_static_mount_keeps_its_prefix_in_development() {
        let root = std::env::temp_dir().join(format!("itranswarp-static-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let static_dir = root.join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("app.css"), "body {}").unwrap();

        let mut config = config(&root.join("upload"));
        config.paths.static_dir = static_dir.to_string_lossy().into_owned();
        assert!(!config.is_production());

        let server = AppServer::builder(config)
            .renderer(Arc::new(NullRenderer))
            .modules(ModuleRegistry::new().with(FnModule::new("src/assets.rs", assets)))
            .build()
            .unwrap();

        assert!(server.routes().lookup(Verb::Get, "/static").is_none());
        assert!(server.routes().lookup(Verb::Get, "/static/{*file}").is_none());
        assert_eq!(server.routes().lookup(Verb::Get, "/assets").unwrap().module, "assets");

        let response = server
            .router()
            .oneshot(Request::get("/static/app.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_static_paths_routable_in_production() {
        let dir = std::env::temp_dir().join(format!("itranswarp-prod-static-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut config = config(&dir);
        config.environment = crate::config::RunMode::Production;

        let server = AppServer::builder(config)
            .renderer(Arc::new(NullRenderer))
            .modules(ModuleRegistry::new().with(FnModule::new("src/assets.rs", assets)))
            .build()
            .unwrap();

        assert_eq!(server.routes().lookup(Verb::Get, "/static").unwrap().module, "assets");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
