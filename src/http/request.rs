//! Request normalization.
//!
//! # Responsibilities
//! - Turn a GET or a POST/PUT/PATCH body into a single input document
//! - Generate a unique request ID (UUID v4) when the client sent none
//!
//! # Design Decisions
//! - GET never carries input, whatever body the client sent
//! - A body that is not a JSON object is treated as no body at all,
//!   without surfacing an error to the caller
//! - The body object is used verbatim; fields are not validated here

use axum::http::{request::Parts, Method, Request};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::command::Document;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Build the canonical command input for a request.
pub fn normalize_input(method: &Method, body: &[u8]) -> Document {
    if *method == Method::GET || body.is_empty() {
        return Document::new();
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(input)) => input,
        Ok(other) => {
            tracing::debug!(
                method = %method,
                kind = json_kind(&other),
                "Body is not a JSON object, treating as no input"
            );
            Document::new()
        }
        Err(e) => {
            tracing::debug!(method = %method, error = %e, "Body is not valid JSON, treating as no input");
            Document::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// The request ID of a request, or `"unknown"`.
pub fn request_id(parts: &Parts) -> String {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_ignores_body() {
        assert!(normalize_input(&Method::GET, b"").is_empty());
        assert!(normalize_input(&Method::GET, br#"{"value": 60}"#).is_empty());
    }

    #[test]
    fn test_object_body_used_verbatim() {
        for method in [Method::POST, Method::PUT, Method::PATCH] {
            let input = normalize_input(&method, br#"{"value": 60, "nested": {"a": [1, 2]}}"#);
            assert_eq!(input["value"], json!(60));
            assert_eq!(input["nested"], json!({"a": [1, 2]}));
        }
    }

    #[test]
    fn test_non_object_body_downgraded() {
        let bodies: [&[u8]; 6] = [br#""plain string""#, b"42", b"[1,2]", b"null", b"{broken", b"not json"];
        for body in bodies {
            assert!(normalize_input(&Method::PATCH, body).is_empty());
        }
    }

    #[test]
    fn test_empty_body() {
        assert!(normalize_input(&Method::POST, b"").is_empty());
    }

    #[test]
    fn test_make_request_id() {
        let request = Request::builder().body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }

    #[test]
    fn test_request_id_lookup() {
        let (parts, _) = Request::builder()
            .header(X_REQUEST_ID, "abc")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_id(&parts), "abc");

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(request_id(&parts), "unknown");
    }
}
