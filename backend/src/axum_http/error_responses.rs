use std::sync::Arc;

use application::errors::{ErrorKind, SubscriptionError, codes};
use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::i18n::{Language, Translator};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("{message}")]
    UseCase {
        status: StatusCode,
        code: u32,
        message: String,
    },
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::ConfigurationError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                codes::PERMISSION_DENIED,
                format!("Unauthorized: {}", msg),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_ARGUMENT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, codes::CONFIGURATION, msg),
            AppError::UseCase {
                status,
                code,
                message,
            } => (status, code, message),
        };

        (status, Json(ErrorResponse { code, message })).into_response()
    }
}

/// Turns usecase errors into localized responses for the caller's language.
pub struct Localizer {
    translator: Arc<Translator>,
    pub language: Language,
}

impl Localizer {
    pub fn new(translator: Arc<Translator>, language: Language) -> Self {
        Self {
            translator,
            language,
        }
    }

    pub fn error(&self, err: SubscriptionError) -> AppError {
        let status = status_for(err.kind());
        match err.kind() {
            ErrorKind::Internal => error!(code = err.code(), error = ?err, "http: request failed"),
            ErrorKind::UpstreamFailure | ErrorKind::ConfigurationError => {
                warn!(code = err.code(), error = ?err, "http: dependency unavailable")
            }
            _ => {}
        }

        AppError::UseCase {
            status,
            code: err.code(),
            message: self.translator.message(&err, self.language),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Localizer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
        let language = Language::negotiate(header("x-language"), header("accept-language"));

        let translator = parts
            .extensions
            .get::<Arc<Translator>>()
            .cloned()
            .ok_or_else(|| AppError::Unavailable("translator is not installed".to_string()))?;

        Ok(Localizer::new(translator, language))
    }
}
