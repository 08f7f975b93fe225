//! Command gateway library.
//!
//! Accepts REST calls under a base path, decides the caller's privilege and
//! dispatches them to a path-keyed command engine.

pub mod command;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use command::{CommandEngine, CommandRegistry, Document, ResultCode};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
