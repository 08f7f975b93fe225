//! HTTP server setup and API dispatch.
//!
//! # Responsibilities
//! - Create Axum Router for `GET|POST|PUT|PATCH {base_path}/...`
//! - Wire up middleware (tracing, body limit, timeout, request ID)
//! - Normalize input, authorize the caller, dispatch to the command engine
//! - Hand the finished response envelope back to the transport
//! - Apply hot-reloaded settings while serving
//!
//! Each request moves through
//! `Received → Normalized → Authorized → Dispatched → Mapped → Sent`
//! exactly once. Nothing here spawns work per request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::command::{CommandEngine, Document};
use crate::config::{ApiConfig, GatewayConfig, SettingsStore};
use crate::http::request::{normalize_input, request_id, MakeRequestUuid};
use crate::http::response::{build_response, ResponseEnvelope};
use crate::observability::metrics;
use crate::security::{SecurityManager, TokenSecurityManager};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn CommandEngine>,
    pub security: Arc<dyn SecurityManager>,
    pub settings: SettingsStore,
    pub api: ApiConfig,
}

/// HTTP server for the command API.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    settings: SettingsStore,
}

impl HttpServer {
    /// Create a server authenticating callers against `settings.users`.
    pub fn new(config: GatewayConfig, engine: Arc<dyn CommandEngine>) -> Self {
        Self::with_security(config, engine, Arc::new(TokenSecurityManager::new()))
    }

    /// Create a server with a custom authentication backend.
    pub fn with_security(
        config: GatewayConfig,
        engine: Arc<dyn CommandEngine>,
        security: Arc<dyn SecurityManager>,
    ) -> Self {
        let settings = SettingsStore::new(config.settings.clone());
        let state = AppState {
            engine,
            security,
            settings: settings.clone(),
            api: config.api.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            settings,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let base = config.api.base_path.trim_end_matches('/');
        let wildcard = format!("{}/{{*path}}", base);
        let root = if base.is_empty() { "/" } else { base };

        Router::new()
            .route(&wildcard, api_methods())
            .route(root, api_methods())
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.api.max_input_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for serving or driving directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared settings store; updates are seen by the next request.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, applying settings from `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_path = %self.config.api.base_path,
            "HTTP server starting"
        );

        let settings = self.settings.clone();
        let running = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                if new_config.api != running.api || new_config.listener != running.listener {
                    tracing::warn!("Listener and API changes take effect after restart");
                }
                if new_config.entities != running.entities {
                    tracing::warn!("Entity changes take effect after restart");
                }
                settings.update(new_config.settings);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn api_methods() -> MethodRouter<AppState> {
    get(api_handler)
        .post(api_handler)
        .put(api_handler)
        .patch(api_handler)
}

/// API handler for all accepted methods.
///
/// A body over the input limit is rejected with 413 whether or not the
/// client sent a Content-Length; any other unreadable body counts as none.
async fn api_handler(
    State(state): State<AppState>,
    parts: Parts,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(
                path = %parts.uri.path(),
                limit = state.api.max_input_bytes,
                "Request body over input limit"
            );
            return rejection.into_response();
        }
        Err(rejection) => {
            tracing::warn!(path = %parts.uri.path(), error = %rejection, "Failed to read request body");
            Bytes::new()
        }
    };
    let input = normalize_input(&parts.method, &bytes);

    dispatch(&state, &parts, input).into_response()
}

/// Privilege flag for a request: the no-token override or an admin claim.
///
/// Authentication and the override read share one settings snapshot, which
/// is released before the caller dispatches.
pub fn authorize(settings: &SettingsStore, security: &dyn SecurityManager, parts: &Parts) -> bool {
    settings.read(|s| s.notoken_api || security.authenticate_request(parts, s).is_admin())
}

/// Run one normalized request through the command engine.
pub fn dispatch(state: &AppState, parts: &Parts, input: Document) -> ResponseEnvelope {
    let start = Instant::now();
    let request_id = request_id(parts);
    let path = parts.uri.path();

    let is_admin = authorize(&state.settings, state.security.as_ref(), parts);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %path,
        is_admin,
        "Dispatching API call"
    );

    let mut output = Document::new();
    let code = state.engine.process(path, is_admin, &input, &mut output);

    metrics::record_api_call(parts.method.as_str(), code, start);

    build_response(code, output, state.api.pretty_json, &request_id)
}
