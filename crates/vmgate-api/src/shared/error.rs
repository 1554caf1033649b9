use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use vmgate_core::{CoreError, ErrorResponse};

/// API error type.
///
/// Precondition failures are not represented here: they travel as
/// `success: false` items inside a 200 envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Backend error: {0}")]
    BackendError(String),
}

impl ApiError {
    pub fn instance_not_found(id: impl std::fmt::Display) -> Self {
        ApiError::InstanceNotFound(format!("Couldn't find Instance with 'id'={}", id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::InstanceNotFound(_) | ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageError(_) | ApiError::BackendError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let (code, message) = match err {
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => ("UNAUTHORIZED", msg),
            ApiError::PermissionDenied(msg) => ("FORBIDDEN", msg),
            ApiError::InstanceNotFound(msg) => ("NOT_FOUND", msg),
            ApiError::ResourceNotFound(msg) => ("NOT_FOUND", msg),
            ApiError::StorageError(msg) => {
                tracing::error!(error = %msg, "storage operation failed");
                ("STORAGE_ERROR", "An internal storage error occurred".to_string())
            }
            ApiError::BackendError(msg) => {
                tracing::error!(error = %msg, "backend operation failed");
                ("BACKEND_ERROR", "An internal backend error occurred".to_string())
            }
        };

        ErrorResponse::new(code, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedAction(action) => ApiError::BadRequest(format!(
                "Unsupported Action {} for the instances resource",
                action
            )),
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorEnvelope { error: self.into() };
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"vmgate\""),
            );
        }

        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::PermissionDenied("x".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::instance_not_found(9).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ResourceNotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::StorageError("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_instance_not_found_message() {
        let err = ApiError::instance_not_found(999_999);
        assert_eq!(
            err.to_string(),
            "Instance not found: Couldn't find Instance with 'id'=999999"
        );
    }

    #[test]
    fn test_conversion_to_error_response() {
        let response: ErrorResponse = ApiError::BadRequest("Must specify a name".to_string()).into();
        assert_eq!(response.error_code, "BAD_REQUEST");
        assert_eq!(response.message, "Must specify a name");
    }

    #[test]
    fn test_storage_error_hides_details() {
        let response: ErrorResponse = ApiError::StorageError("Lock poisoned".to_string()).into();
        assert_eq!(response.error_code, "STORAGE_ERROR");
        assert!(!response.message.contains("Lock poisoned"));
    }

    #[test]
    fn test_core_unsupported_action_is_bad_request() {
        let err: ApiError = CoreError::UnsupportedAction("explode".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m.contains("explode")));
    }

    #[tokio::test]
    async fn test_into_response_forbidden() {
        let response = ApiError::PermissionDenied("Use of Action stop is forbidden".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["error_code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "Use of Action stop is forbidden");
    }

    #[tokio::test]
    async fn test_into_response_unauthorized_sets_challenge() {
        let response = ApiError::Unauthorized("Missing credentials".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"vmgate\""
        );
    }
}
