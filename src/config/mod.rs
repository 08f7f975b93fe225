//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!
//! Per request:
//!     store.rs hands out an atomic WebSettings snapshot
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps WebSettings into the store
//! ```
//!
//! # Design Decisions
//! - Only `settings` is hot reloadable; listener and API shape need a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, EntityConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
    UserConfig, WebSettings,
};
pub use store::SettingsStore;
