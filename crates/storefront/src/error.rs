//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every error leaves as
//! `{"error": "<message>", "code": "<code>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::claude::ClaudeError;
use crate::db::RepositoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Resource not found (also used for malformed ids).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Persistence(RepositoryError),

    /// The support assistant has no API key configured.
    #[error("support assistant is not available")]
    AssistantUnavailable,

    /// The support assistant provider failed.
    #[error("Assistant error: {0}")]
    Assistant(#[from] ClaudeError),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a validation error from anything printable.
    pub fn validation(err: impl std::fmt::Display) -> Self {
        Self::Validation(err.to_string())
    }

    /// Stable machine-readable code sent alongside the message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Persistence(_) => "persistence_error",
            Self::AssistantUnavailable => "assistant_unavailable",
            Self::Assistant(_) => "assistant_error",
            Self::RateLimited => "rate_limited",
            Self::Internal(_) => "internal_error",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AssistantUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Assistant(_) => StatusCode::BAD_GATEWAY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource"),
            other => Self::Persistence(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Persistence(_) | Self::Internal(_) | Self::Assistant(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Persistence(_) => "operation failed".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Assistant(_) => "The support assistant could not answer right now".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: message,
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map(|b| b.to_bytes())
            .unwrap_or_default();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::NotFound("Product").to_string(), "Product not found");
        assert_eq!(
            AppError::validation("rating must be between 1 and 5, got 6").to_string(),
            "rating must be between 1 and 5, got 6"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::NotFound("Order")), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::AssistantUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err = AppError::from(RepositoryError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = AppError::from(RepositoryError::DataCorruption("bad".to_string()));
        assert_eq!(err.code(), "persistence_error");
    }

    #[tokio::test]
    async fn test_persistence_error_hides_details() {
        let (status, body) = body_json(AppError::from(RepositoryError::DataCorruption(
            "secret table detail".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "operation failed");
        assert_eq!(body["code"], "persistence_error");
    }

    #[tokio::test]
    async fn test_validation_body() {
        let (status, body) = body_json(AppError::validation("items cannot be empty")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "items cannot be empty");
        assert_eq!(body["code"], "validation_error");
    }
}
