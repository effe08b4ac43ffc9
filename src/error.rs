use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File too large (max {max_kb} KB)")]
    SizeExceeded { max_kb: u64 },

    #[error("File type not allowed: {mime_type}")]
    TypeDisallowed { mime_type: String },

    #[error("Request body too large (max {max_kb} KB)")]
    BodyTooLarge { max_kb: u64 },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::SizeExceeded { max_kb } => {
                tracing::warn!("Rejected upload: file exceeds {} KB", max_kb);
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("File too large (max {} KB)", max_kb),
                )
            }
            AppError::TypeDisallowed { mime_type } => {
                tracing::warn!("Rejected upload: type {} not allowed", mime_type);
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    format!("File type not allowed: {}", mime_type),
                )
            }
            AppError::BodyTooLarge { max_kb } => {
                tracing::warn!("Rejected upload: request body exceeds {} KB", max_kb);
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_map_to_payload_too_large() {
        let file = AppError::SizeExceeded { max_kb: 150 }.into_response();
        let body = AppError::BodyTooLarge { max_kb: 16534 }.into_response();

        assert_eq!(file.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn internal_errors_are_500() {
        let err: AppError = anyhow::anyhow!("join failed").into();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn type_rejection_is_415() {
        let response = AppError::TypeDisallowed {
            mime_type: "application/pdf".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
