//! Error translation and the panic supervisor.
//!
//! # Responsibilities
//! - Turn pipeline error markers into client responses
//! - Keep internal detail out of production responses
//! - Complete a request whose handler panicked with a generic failure
//!
//! # Design Decisions
//! - Structured API errors reach the client verbatim in every mode
//! - Outside production, unhandled errors show their full detail
//! - An optional tap observes every translated error

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, PipelineError};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Observer for errors reaching the translator.
pub trait ErrorTap: Send + Sync {
    fn observe(&self, error: &AppError);
}

impl<F> ErrorTap for F
where
    F: Fn(&AppError) + Send + Sync,
{
    fn observe(&self, error: &AppError) {
        self(error)
    }
}

pub const GENERIC_ERROR_BODY: &str = "Internal Server Error";

fn generic_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_BODY).into_response()
}

/// Developer-facing error display with full detail.
fn detailed_error(error: &AppError) -> Response {
    let body = format!("{error}\n\n{error:#?}\n");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Decide the client response for an error.
pub fn translate(error: &AppError, production: bool) -> Response {
    match error {
        AppError::Api(api) => {
            tracing::info!(error = %api.error, data = %api.data, "Send api error to client");
            api.to_response()
        }
        other if production => {
            tracing::error!(error = %other, kind = other.kind(), "Unhandled error");
            generic_error()
        }
        other => {
            tracing::error!(error = ?other, kind = other.kind(), "Unhandled error (development)");
            detailed_error(other)
        }
    }
}

pub async fn translate_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    let Some(PipelineError(error)) = response.extensions_mut().remove::<PipelineError>() else {
        return response;
    };

    tracing::debug!(path = %path, kind = error.kind(), "Translating pipeline error");
    metrics::record_error(error.kind());
    if let Some(tap) = &state.error_tap {
        tap.observe(&error);
    }

    translate(&error, state.config.is_production())
}

/// Response for a handler that panicked.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, ">>>>>> UNCAUGHT PANIC >>>>>>");
    metrics::record_error("panic");
    generic_error()
}

/// Shared tap pointer stored in the application state.
pub type SharedErrorTap = Arc<dyn ErrorTap>;
