//! Run-mode dependent stages.
//!
//! # Responsibilities
//! - Development: add random latency to API calls, disable template caching
//! - Production: trust the reverse proxy for the client address
//!
//! # Design Decisions
//! - The fork is decided once at boot; stages are only installed for their mode
//! - Client address falls back to the socket peer when no proxy header exists

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use rand::Rng;

use crate::config::AppConfig;
use crate::http::server::AppState;
use crate::pipeline::area::API_PREFIX;
use crate::render::TemplateRenderer;

/// Best-known address of the client, attached to every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientAddr(pub Option<IpAddr>);

/// Boot-time settings that depend on the run mode.
pub fn apply_boot_mode(config: &AppConfig, renderer: &dyn TemplateRenderer) {
    if config.is_production() {
        tracing::info!("Production mode: trusting reverse proxy headers");
    } else {
        renderer.set_cache(false);
        tracing::info!(
            static_dir = %config.paths.static_dir,
            api_jitter_ms = config.development.api_jitter_ms,
            "Development mode: template cache off, serving static files"
        );
    }
}

/// Random delay in `[0, max_ms)`; `None` when disabled.
pub fn jitter(max_ms: u64) -> Option<Duration> {
    if max_ms == 0 {
        return None;
    }
    let ms = rand::thread_rng().gen_range(0..max_ms);
    Some(Duration::from_millis(ms))
}

/// Simulated latency for `/api/` requests in development.
pub async fn api_jitter(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.uri().path().starts_with(API_PREFIX) {
        if let Some(delay) = jitter(state.config.development.api_jitter_ms) {
            tokio::time::sleep(delay).await;
        }
    }
    next.run(request).await
}

/// First hop of `X-Forwarded-For`, if it parses.
pub fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok())
}

pub async fn client_addr(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let addr = if state.config.is_production() {
        forwarded_for(request.headers()).or(peer)
    } else {
        peer
    };

    request.extensions_mut().insert(ClientAddr(addr));
    next.run(request).await
}
