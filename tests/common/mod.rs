//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use command_gateway::command::{CommandEngine, Document, ResultCode};
use command_gateway::config::{GatewayConfig, UserConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const GUEST_TOKEN: &str = "guest-token";

/// One observed call into the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub is_admin: bool,
    pub input: Document,
}

/// Engine that records every call and replies with a fixed result.
pub struct RecordingEngine {
    calls: Mutex<Vec<RecordedCall>>,
    reply: (ResultCode, Document),
}

impl RecordingEngine {
    pub fn replying(code: ResultCode, output: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: (code, output.as_object().cloned().unwrap_or_default()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("engine was not called")
    }
}

impl CommandEngine for RecordingEngine {
    fn process(&self, path: &str, is_admin: bool, input: &Document, output: &mut Document) -> ResultCode {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            is_admin,
            input: input.clone(),
        });
        *output = self.reply.1.clone();
        self.reply.0
    }
}

/// Default config with one admin and one guest user.
pub fn config_with_users() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.settings.users = vec![
        UserConfig {
            username: "admin".into(),
            token: ADMIN_TOKEN.into(),
            admin: true,
        },
        UserConfig {
            username: "guest".into(),
            token: GUEST_TOKEN.into(),
            admin: false,
        },
    ];
    config
}

/// Response captured from the router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.raw).expect("response body is not JSON")
    }
}

/// Send a body without Content-Length, as a chunked upload arrives.
pub async fn send_unsized(router: Router, method: &str, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    collect(router.oneshot(request).await.unwrap()).await
}

/// Drive the router with a single request.
pub async fn send(
    router: Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
    token: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(body) = body {
        builder = builder
            .header("content-type", "application/json")
            .header("content-length", body.len());
    }
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    collect(router.oneshot(request).await.unwrap()).await
}

async fn collect(response: axum::response::Response) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        headers,
        raw,
    }
}
