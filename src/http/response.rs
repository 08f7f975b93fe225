//! Response construction.
//!
//! # Responsibilities
//! - Map command result codes to HTTP status codes
//! - Default an empty successful output to `{"message": "OK"}`
//! - Log failures with the engine's message and the result code name
//! - Serialize the output document as the JSON response body
//!
//! # Design Decisions
//! - The status mapping is an exhaustive match with no default arm
//! - The logged failure string never enters the response body
//! - The envelope is a plain owned value consumed once by the transport

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::command::{Document, ResultCode};

/// HTTP status for a command result.
pub fn status_for(code: ResultCode) -> StatusCode {
    match code {
        ResultCode::Fail => StatusCode::BAD_REQUEST,
        ResultCode::Ok => StatusCode::OK,
        ResultCode::NotFound => StatusCode::BAD_REQUEST,
        ResultCode::Error => StatusCode::BAD_REQUEST,
        ResultCode::NotAllowed => StatusCode::UNAUTHORIZED,
    }
}

/// The line logged for a failed call.
pub fn failure_message(code: ResultCode, output: &Document) -> String {
    match output.get("message") {
        Some(message) => {
            let message = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("Call failed with error: {} ({})", message, code.as_str())
        }
        _ => format!("Call failed with error code ({})", code.as_str()),
    }
}

/// A finished API response: status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: Document,
    pretty: bool,
}

impl ResponseEnvelope {
    pub const CONTENT_TYPE: &'static str = "application/json";

    pub fn new(status: StatusCode, body: Document, pretty: bool) -> Self {
        Self {
            status,
            body,
            pretty,
        }
    }

    fn to_json(&self) -> Vec<u8> {
        let serialized = if self.pretty {
            serde_json::to_vec_pretty(&self.body)
        } else {
            serde_json::to_vec(&self.body)
        };
        serialized.unwrap_or_else(|_| b"{}".to_vec())
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.to_json()));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(Self::CONTENT_TYPE),
        );
        response
    }
}

/// Turn a command result into the envelope handed to the transport.
pub fn build_response(
    code: ResultCode,
    mut output: Document,
    pretty: bool,
    request_id: &str,
) -> ResponseEnvelope {
    if code.is_ok() {
        tracing::debug!(request_id = %request_id, "API command called successfully");
        if output.is_empty() {
            output.insert("message".into(), Value::String("OK".into()));
        }
    } else {
        let error = failure_message(code, &output);
        tracing::error!(request_id = %request_id, code = %code, "{}", error);
    }

    let status = status_for(code);
    tracing::trace!(
        request_id = %request_id,
        status = status.as_u16(),
        body = %serde_json::Value::Object(output.clone()),
        "API response"
    );
    ResponseEnvelope::new(status, output, pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_status_mapping_is_total() {
        let statuses: Vec<u16> = ResultCode::ALL.iter().map(|c| status_for(*c).as_u16()).collect();
        assert_eq!(statuses, vec![400, 200, 400, 400, 401]);
    }

    #[test]
    fn test_failure_message_with_engine_message() {
        let output = doc(json!({"message": "unknown device heatpump"}));
        assert_eq!(
            failure_message(ResultCode::NotFound, &output),
            "Call failed with error: unknown device heatpump (Not Found)"
        );
    }

    #[test]
    fn test_failure_message_without_message() {
        assert_eq!(
            failure_message(ResultCode::Error, &Document::new()),
            "Call failed with error code (Error)"
        );
        let output = doc(json!({"detail": "x"}));
        assert_eq!(
            failure_message(ResultCode::Fail, &output),
            "Call failed with error code (Failed)"
        );
    }

    #[test]
    fn test_ok_with_empty_output_defaults_message() {
        let envelope = build_response(ResultCode::Ok, Document::new(), false, "t");
        assert_eq!(envelope.status, StatusCode::OK);
        assert_eq!(envelope.body, doc(json!({"message": "OK"})));
    }

    #[test]
    fn test_ok_output_untouched() {
        let envelope = build_response(ResultCode::Ok, doc(json!({"value": 1})), false, "t");
        assert_eq!(envelope.body, doc(json!({"value": 1})));
    }

    #[test]
    fn test_failure_body_is_engine_output() {
        let envelope = build_response(ResultCode::NotFound, Document::new(), false, "t");
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert!(envelope.body.is_empty());

        let output = doc(json!({"message": "non-authenticated"}));
        let envelope = build_response(ResultCode::NotAllowed, output.clone(), false, "t");
        assert_eq!(envelope.status, StatusCode::UNAUTHORIZED);
        assert_eq!(envelope.body, output);
    }

    #[tokio::test]
    async fn test_into_response() {
        let envelope = build_response(ResultCode::Ok, Document::new(), true, "t");
        let response = envelope.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "OK"}));
    }
}
