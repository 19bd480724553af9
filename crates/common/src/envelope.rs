//! JSON response envelope shared by all Coursework HTTP APIs.
//!
//! ```json
//! {
//!   "status": "success",
//!   "message": "Course created",
//!   "data": { ... },
//!   "timestamp": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! Error envelopes carry a machine-readable `code` instead of `data`.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Challenge sent with every 401 response.
const BEARER_CHALLENGE: &str = "Bearer realm=\"coursework\", error=\"invalid_token\"";

/// Outcome marker carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: Some(data),
            code: None,
            timestamp: Utc::now(),
        }
    }
}

impl Envelope<()> {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: None,
            code: Some(code.into()),
            timestamp: Utc::now(),
        }
    }
}

/// A successful envelope paired with its HTTP status.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::success(message, data),
        }
    }

    /// 201 Created.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope::success(message, data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Build an error envelope response.
///
/// 401 responses carry a `WWW-Authenticate: Bearer` challenge.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let mut response = (status, Json(Envelope::error(code, message))).into_response();

    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BEARER_CHALLENGE));
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ok_response_shape() {
        let response = ApiResponse::ok("Fetched", serde_json::json!({ "id": 1 })).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Fetched");
        assert_eq!(body["data"]["id"], 1);
        assert!(body.get("code").is_none());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_created_response_status() {
        let response = ApiResponse::created("Created", vec![1, 2]).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Course not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Course not found");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_carries_challenge() {
        let response = error_response(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "nope");

        let challenge = response.headers().get(WWW_AUTHENTICATE).unwrap();
        assert!(challenge.to_str().unwrap().starts_with("Bearer"));
    }

    #[test]
    fn test_envelope_deserializes_without_optional_fields() {
        let raw = r#"{"status":"error","message":"x","timestamp":"2026-01-01T00:00:00Z"}"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.status, EnvelopeStatus::Error);
        assert!(envelope.data.is_none());
        assert!(envelope.code.is_none());
    }
}
