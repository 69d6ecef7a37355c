//! Per-request handler context.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request},
    http::{Method, Uri},
    response::{Html, IntoResponse},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{ApiError, AppError, HandlerResult};
use crate::pipeline::identity::Identity;
use crate::pipeline::response_mode::{now_millis, ResponseMode};
use crate::render::TemplateRenderer;

/// Everything a handler receives for one request.
pub struct RequestContext {
    request: Request,
    params: HashMap<String, String>,
    identity: Option<Identity>,
    mode: ResponseMode,
    client_addr: Option<IpAddr>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl RequestContext {
    pub fn new(
        request: Request,
        params: HashMap<String, String>,
        identity: Option<Identity>,
        mode: ResponseMode,
        client_addr: Option<IpAddr>,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            request,
            params,
            identity,
            mode,
            client_addr,
            renderer,
        }
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Give up the context and take the raw request, e.g. for multipart.
    pub fn into_request(self) -> Request {
        self.request
    }

    /// A captured path segment such as `id` in `/api/articles/{id}`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn mode(&self) -> &ResponseMode {
        &self.mode
    }

    pub fn client_addr(&self) -> Option<IpAddr> {
        self.client_addr
    }

    /// Render a view through the response mode chosen by the area gate.
    pub fn render(&self, view: &str, model: Value) -> HandlerResult {
        let template = self.mode.view(view);
        let model = self.mode.augment(model, self.identity.as_ref(), now_millis());
        let html = self.renderer.render(&template, &model)?;
        Ok(Html(html).into_response())
    }

    /// Serialize `value` as the JSON response.
    pub fn json<T: Serialize>(&self, value: &T) -> HandlerResult {
        Ok(Json(value).into_response())
    }

    /// Parse the request body as JSON.
    pub async fn body_json<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let Json(value) = Json::<T>::from_request(self.request, &())
            .await
            .map_err(|rejection| ApiError::new("request:invalid", "body", rejection.body_text()))?;
        Ok(value)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("params", &self.params)
            .field("identity", &self.identity)
            .field("mode", &self.mode)
            .field("client_addr", &self.client_addr)
            .finish_non_exhaustive()
    }
}
