//! # Service-boundary errors
//!
//! [`ClipError`] is the tagged result type returned by every service operation.
//! Store and image errors convert into it with `?`. With the `server` feature it
//! also implements axum's `IntoResponse`, mapping each kind to a status code and a
//! `{success: false, message}` body:
//!
//! | Variant | Status |
//! |---------|--------|
//! | `NotFound` | 404 |
//! | `Validation` | 400 |
//! | `Persistence` | 500 |
//! | `Encoding` | 500 |
//!
//! Internal failures are logged in full and answered with a generic message.

use store::{ImageError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("Clip not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<StoreError> for ClipError {
    fn from(e: StoreError) -> Self {
        ClipError::Persistence(e.to_string())
    }
}

impl From<ImageError> for ClipError {
    fn from(e: ImageError) -> Self {
        ClipError::Validation(e.to_string())
    }
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for ClipError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match &self {
            ClipError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ClipError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ClipError::Persistence(_) => {
                tracing::error!("persistence failure: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage unavailable".to_string(),
                )
            }
            ClipError::Encoding(_) => {
                tracing::error!("encoding failure: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, axum::Json(crate::models::ErrorBody::new(message))).into_response()
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_returns_404() {
        let resp = ClipError::NotFound("abc".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Clip not found: abc");
    }

    #[tokio::test]
    async fn test_validation_returns_400() {
        let err: ClipError = ImageError::UnsupportedType("image/gif".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Invalid image format: image/gif");
    }

    #[tokio::test]
    async fn test_persistence_hides_details() {
        let err: ClipError = StoreError::Backend("connection refused on 10.0.0.3".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Storage unavailable");
    }
}
