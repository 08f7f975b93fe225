//! Command execution subsystem.
//!
//! # Data Flow
//! ```text
//! http dispatcher
//!     → CommandEngine::process(path, is_admin, input)
//!     → path.rs (split "/api/{device}[/{id}][/{command}]")
//!     → registry.rs (device + command lookup, privilege check)
//!     → handler (system commands, entities.rs)
//!     → (ResultCode, output document)
//! ```
//!
//! # Design Decisions
//! - The HTTP layer never inspects the path; it is passed through opaquely
//! - Domain failures are `ResultCode` values, never Rust errors
//! - Documents are plain JSON objects owned by a single request

pub mod entities;
pub mod path;
pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use entities::EntityStore;
pub use path::CommandPath;
pub use registry::{CommandContext, CommandRegistry};

/// A JSON object used for command input and output.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Outcome of a single command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    /// Generic caller error.
    Fail,
    /// Command executed.
    Ok,
    /// Unknown device, entity or command.
    NotFound,
    /// Engine-internal failure.
    Error,
    /// Caller lacks the privilege the command requires.
    NotAllowed,
}

impl ResultCode {
    pub const ALL: [ResultCode; 5] = [
        ResultCode::Fail,
        ResultCode::Ok,
        ResultCode::NotFound,
        ResultCode::Error,
        ResultCode::NotAllowed,
    ];

    /// Human readable name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Fail => "Failed",
            ResultCode::Ok => "OK",
            ResultCode::NotFound => "Not Found",
            ResultCode::Error => "Error",
            ResultCode::NotAllowed => "Not Authorized",
        }
    }

    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ResultCode::Fail => "fail",
            ResultCode::Ok => "ok",
            ResultCode::NotFound => "not_found",
            ResultCode::Error => "error",
            ResultCode::NotAllowed => "not_allowed",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResultCode::Ok)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The command execution engine the gateway dispatches into.
///
/// Implementations resolve `path` themselves; the caller only supplies the
/// privilege flag and the normalized input. The engine may populate `output`
/// regardless of the returned code.
pub trait CommandEngine: Send + Sync {
    fn process(
        &self,
        path: &str,
        is_admin: bool,
        input: &Document,
        output: &mut Document,
    ) -> ResultCode;
}
