//! Request-time error types.
//!
//! Handlers and middleware stages fail with [`AppError`]. Turning an
//! `AppError` into a response does not decide what the client sees: it
//! yields a bare 500 that carries a [`PipelineError`] marker, and the error
//! translator stage (see `pipeline::errors`) replaces it with the final
//! response for the current run mode.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Structured client-facing error raised by handler logic.
///
/// Always delivered to the client verbatim, in every run mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{error}: {message}")]
pub struct ApiError {
    /// Machine-readable error code, e.g. `parameter:invalid`.
    pub error: String,
    /// Extra data such as the offending field name.
    pub data: String,
    /// Human-readable description.
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    pub fn new(
        error: impl Into<String>,
        data: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            data: data.into(),
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// A request parameter is missing or malformed.
    pub fn invalid_param(name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("Invalid parameter: {name}");
        Self::new("parameter:invalid", name, message)
    }

    /// The requested resource does not exist.
    pub fn not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("{name} not found");
        Self::new("entity:notfound", name, message).with_status(StatusCode::NOT_FOUND)
    }

    /// The current identity may not perform the operation.
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new("permission:denied", "", message).with_status(StatusCode::FORBIDDEN)
    }

    /// Override the HTTP status sent with this error.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response the client receives for this error.
    pub fn to_response(&self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Any error that can leave a handler or a pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Structured error surfaced to the client as-is.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Unhandled failure with a message.
    #[error("{0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(String),

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Api(_) => "api",
            Self::Internal(_) => "internal",
            Self::Io(_) => "io",
            Self::Render(_) => "render",
            Self::Other(_) => "other",
        }
    }
}

/// Marker carried in response extensions from the failing stage to the
/// error translator.
#[derive(Debug, Clone)]
pub struct PipelineError(pub Arc<AppError>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response
            .extensions_mut()
            .insert(PipelineError(Arc::new(self)));
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        AppError::Api(self).into_response()
    }
}

/// Result type returned by route handlers.
pub type HandlerResult = Result<Response, AppError>;
