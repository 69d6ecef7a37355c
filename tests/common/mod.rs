//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{request::Parts, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use tower::ServiceExt;

use itranswarp::config::{AppConfig, RunMode};
use itranswarp::pipeline::{Identity, IdentityResolver, Role};
use itranswarp::render::TemplateRenderer;
use itranswarp::AppError;

/// Header the test resolver reads: `id:name:role`, or `broken` to fail.
pub const USER_HEADER: &str = "x-test-user";

/// Identity resolver driven by [`USER_HEADER`].
pub struct HeaderResolver;

impl IdentityResolver for HeaderResolver {
    fn resolve<'a>(&'a self, parts: &'a Parts) -> BoxFuture<'a, Result<Option<Identity>, AppError>> {
        Box::pin(async move {
            let Some(value) = parts.headers.get(USER_HEADER) else {
                return Ok(None);
            };
            let value = value.to_str().map_err(|e| AppError::internal(e.to_string()))?;
            if value == "broken" {
                return Err(AppError::internal("identity store unavailable"));
            }
            let mut fields = value.splitn(3, ':');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(id), Some(name), Some(role)) => {
                    let role = role.parse().map_err(|_| AppError::internal("bad role"))?;
                    Ok(Some(Identity::new(id, name, Role(role))))
                }
                _ => Ok(None),
            }
        })
    }
}

/// Renders the template name and model as JSON.
pub struct EchoRenderer;

impl TemplateRenderer for EchoRenderer {
    fn render(&self, view: &str, model: &Value) -> Result<String, AppError> {
        Ok(json!({ "view": view, "model": model }).to_string())
    }

    fn set_cache(&self, _enabled: bool) {}
}

/// Error tap that records every error it sees.
#[derive(Clone, Default)]
pub struct RecordingTap {
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingTap {
    pub fn observe(&self, error: &AppError) {
        self.seen.lock().unwrap().push(error.to_string());
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// A fresh, not yet existing upload dir per call.
pub fn temp_upload_dir() -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("itranswarp-it-{}-{}", std::process::id(), n))
}

/// Config for tests: no jitter, private upload dir.
pub fn test_config(environment: RunMode) -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = environment;
    config.development.api_jitter_ms = 0;
    config.paths.upload_dir = temp_upload_dir().to_string_lossy().into_owned();
    config.site.name = "Test Site".into();
    config
}

pub fn user(id: &str, role: u32) -> String {
    format!("{id}:User {id}:{role}")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// Send one request through the router.
pub async fn send(router: &Router, method: Method, uri: &str, user: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(router: &Router, uri: &str, user: Option<&str>) -> TestResponse {
    send(router, Method::GET, uri, user).await
}
