//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, method routing)
//!     → request.rs (request ID, body → input document)
//!     → security (caller authentication) + settings (no-token override)
//!     → command engine (path, privilege, input)
//!     → response.rs (status mapping, default message, JSON envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{normalize_input, MakeRequestUuid, X_REQUEST_ID};
pub use response::{build_response, status_for, ResponseEnvelope};
pub use server::{authorize, dispatch, AppState, HttpServer};
