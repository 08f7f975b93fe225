//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming API request:
//!     → auth.rs (bearer header or access_token query → Authentication)
//!     → http dispatcher combines it with the no-token override
//!     → privilege flag handed to the command engine
//! ```
//!
//! # Design Decisions
//! - Authentication never fails a request; it only withholds privilege
//! - Per-command authorization belongs to the command engine

pub mod auth;

pub use auth::{Authentication, SecurityManager, TokenSecurityManager, User};
