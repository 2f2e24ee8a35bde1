use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every session-authenticated endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Work order operation not found",
    "requestId": "req-abc123xyz"
}))]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable error description, never carries internal details
    pub error: String,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No team selected")]
    NoTeamSelected,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot {action} {entity} in status '{from}'")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        from: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::ValidationError(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        ServiceError::ValidationError(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        ServiceError::NotFound(format!("{entity} not found"))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::NoTeamSelected => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidTransition { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Server-side failures collapse to a generic message.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            Self::Forbidden(_) => "Forbidden".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.response_message(),
            request_id: current_request_id(),
        };

        (status, Json(body)).into_response()
    }
}

/// Envelope for `/api/v1` errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "code": "ROUTING_NOT_FOUND",
    "message": "Routing not found",
    "status": 404
}))]
pub struct ExternalErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExternalApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    #[error("Routing not found")]
    RoutingNotFound,

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited { limit: u32, reset_at_ms: i64 },

    #[error("Internal server error")]
    Internal,
}

impl ExternalApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::RoutingNotFound => "ROUTING_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::RoutingNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ExternalErrorBody {
        let details = match self {
            Self::Validation { details, .. } => details.clone(),
            _ => None,
        };
        ExternalErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            status: self.status_code().as_u16(),
            details,
        }
    }
}

impl From<ServiceError> for ExternalApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ValidationError(message) => Self::validation(message),
            ServiceError::NotFound(message) => Self::NotFound(message),
            ServiceError::Unauthorized => Self::Unauthorized("Unauthorized".to_string()),
            other => {
                error!(error = %other, "external api request failed");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ExternalApiError {
    fn into_response(self) -> Response {
        let response = (self.status_code(), Json(self.body())).into_response();
        match self {
            Self::RateLimited { limit, reset_at_ms } => {
                crate::auth::external::with_rate_limit_headers(response, limit, 0, reset_at_ms)
            }
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::not_found("Order").into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.error, "Order not found");
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(ServiceError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::NoTeamSelected.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::not_found("Routing").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InvalidTransition {
                entity: "work order operation",
                action: "resume",
                from: "pending".into(),
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("relation missing".into()))
                .response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::InternalError("disk on fire".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(ServiceError::Unauthorized.response_message(), "Unauthorized");
        assert_eq!(
            ServiceError::InvalidTransition {
                entity: "work order operation",
                action: "complete",
                from: "paused".into(),
            }
            .response_message(),
            "Cannot complete work order operation in status 'paused'"
        );
    }

    #[tokio::test]
    async fn external_error_envelope_carries_code_and_status() {
        let response = ExternalApiError::RoutingNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ExternalErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.code, "ROUTING_NOT_FOUND");
        assert_eq!(payload.status, 404);
        assert!(payload.details.is_none());
    }

    #[test]
    fn rate_limited_response_carries_limit_headers() {
        let response = ExternalApiError::RateLimited {
            limit: 5,
            reset_at_ms: 1_700_000_060_000,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers()["x-ratelimit-reset"], "1700000060000");
    }

    #[test]
    fn external_error_from_service_error_never_leaks_internals() {
        let err: ExternalApiError =
            ServiceError::DatabaseError(DbErr::Custom("secret table".into())).into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.body().message, "Internal server error");

        let err: ExternalApiError = ServiceError::ValidationError("bad date".into()).into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
