//! Maps dispatch results and per-request errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dynapi_core::{BindError, OperationError};
use serde_json::{json, Value};

/// Errors surfaced by a compiled route handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl ApiError {
    /// 413 for oversized bodies, 400 for any other binding failure, 500 for
    /// errors raised by the target operation.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Bind(BindError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Bind(_) => StatusCode::BAD_REQUEST,
            Self::Operation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bind(err) => err.kind(),
            Self::Operation(_) => "OperationFailed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Target failures are logged in full but not echoed to the caller.
        let message = match &self {
            Self::Bind(err) => err.to_string(),
            Self::Operation(err) => {
                tracing::error!(error = %err, "operation failed");
                "internal server error".to_string()
            }
        };
        let body = json!({
            "error": self.kind(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

/// Wraps a dispatch result: `200` with the JSON payload, or an empty `200`
/// when the operation produced nothing.
#[must_use]
pub fn success(result: Option<Value>) -> Response {
    match result {
        Some(value) => (StatusCode::OK, Json(value)).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_mapping() {
        let too_large = ApiError::from(BindError::PayloadTooLarge { limit: 1 });
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let invalid = ApiError::from(BindError::InvalidBody {
            reason: "x".to_string(),
        });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let unsupported = ApiError::from(BindError::UnsupportedParameterType {
            parameter: "p".to_string(),
            target: "Double".to_string(),
        });
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);

        let failed = ApiError::from(OperationError::Internal(anyhow::anyhow!("boom")));
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn conversion_error_body_names_the_parameter() {
        let err = ApiError::from(BindError::ParameterConversion {
            parameter: "age".to_string(),
            target: "Int32".to_string(),
            raw: "thirty".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "ParameterConversionError");
        assert_eq!(
            body["message"],
            "cannot convert 'thirty' to type 'Int32' for parameter 'age'"
        );
    }

    #[tokio::test]
    async fn operation_error_body_hides_details() {
        let err = ApiError::from(OperationError::Internal(anyhow::anyhow!("db password wrong")));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "OperationFailed");
        assert_eq!(body["message"], "internal server error");
    }

    #[tokio::test]
    async fn empty_success_has_no_body() {
        let response = success(None);
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn success_wraps_payload() {
        let response = success(Some(json!({"id": 1})));
        assert_eq!(body_json(response).await, json!({"id": 1}));
    }
}
