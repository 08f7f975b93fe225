//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Detect duplicate tokens and entities
//! - Keep entities off the built-in `system` device and reserved command names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::command::path::parse_id;
use crate::command::registry::{RESERVED_COMMANDS, SYSTEM_DEVICE};
use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_path must start with '/' and not end with '/': {0:?}")]
    BasePath(String),

    #[error("api.max_input_bytes must be greater than zero")]
    MaxInputBytes,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("settings.users[{0}] has an empty username")]
    EmptyUsername(usize),

    #[error("settings.users[{0}] has an empty token")]
    EmptyToken(usize),

    #[error("settings.users[{0}] reuses a token")]
    DuplicateToken(usize),

    #[error("entities[{0}] has an empty device or name")]
    EmptyEntity(usize),

    #[error("entities[{0}] device {1:?} looks like an id segment")]
    AmbiguousDevice(usize, String),

    #[error("entities[{0}] uses the reserved device {1:?}")]
    ReservedDevice(usize, String),

    #[error("entities[{0}] name {1:?} is a reserved command")]
    ReservedEntityName(usize, String),

    #[error("entities[{0}] name {1:?} looks like an id segment")]
    AmbiguousEntityName(usize, String),

    #[error("entities[{0}] duplicates {1}/{2}")]
    DuplicateEntity(usize, String, String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base = &config.api.base_path;
    if !base.starts_with('/') || (base.len() > 1 && base.ends_with('/')) {
        errors.push(ValidationError::BasePath(base.clone()));
    }
    if config.api.max_input_bytes == 0 {
        errors.push(ValidationError::MaxInputBytes);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let mut tokens = HashSet::new();
    for (i, user) in config.settings.users.iter().enumerate() {
        if user.username.trim().is_empty() {
            errors.push(ValidationError::EmptyUsername(i));
        }
        if user.token.is_empty() {
            errors.push(ValidationError::EmptyToken(i));
        } else if !tokens.insert(user.token.as_str()) {
            errors.push(ValidationError::DuplicateToken(i));
        }
    }

    let mut entities = HashSet::new();
    for (i, entity) in config.entities.iter().enumerate() {
        let device = entity.device.trim().to_lowercase();
        let name = entity.name.trim().to_lowercase();
        if device.is_empty() || name.is_empty() {
            errors.push(ValidationError::EmptyEntity(i));
            continue;
        }
        if device == SYSTEM_DEVICE {
            errors.push(ValidationError::ReservedDevice(i, device.clone()));
        } else if parse_id(&device).is_some() {
            errors.push(ValidationError::AmbiguousDevice(i, device.clone()));
        }
        if RESERVED_COMMANDS.contains(&name.as_str()) {
            errors.push(ValidationError::ReservedEntityName(i, name.clone()));
        } else if parse_id(&name).is_some() {
            errors.push(ValidationError::AmbiguousEntityName(i, name.clone()));
        }
        if !entities.insert((device.clone(), name.clone())) {
            errors.push(ValidationError::DuplicateEntity(i, device, name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{EntityConfig, UserConfig};

    fn user(name: &str, token: &str) -> UserConfig {
        UserConfig {
            username: name.into(),
            token: token.into(),
            admin: false,
        }
    }

    fn entity(device: &str, name: &str) -> EntityConfig {
        EntityConfig {
            device: device.into(),
            name: name.into(),
            value: serde_json::Value::Null,
            writable: true,
            admin_only: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.api.base_path = "api/".into();
        config.api.max_input_bytes = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BasePath("api/".into()),
                ValidationError::MaxInputBytes,
                ValidationError::RequestTimeout,
            ]
        );
    }

    #[test]
    fn test_user_checks() {
        let mut config = GatewayConfig::default();
        config.settings.users = vec![user("a", "t1"), user("", "t2"), user("c", "t1"), user("d", "")];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyUsername(1),
                ValidationError::DuplicateToken(2),
                ValidationError::EmptyToken(3),
            ]
        );
    }

    #[test]
    fn test_system_device_reserved() {
        let mut config = GatewayConfig::default();
        config.entities = vec![entity("System", "echo")];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ReservedDevice(0, "system".into())]);
    }

    #[test]
    fn test_reserved_entity_names() {
        let mut config = GatewayConfig::default();
        config.entities = vec![entity("boiler", "info"), entity("boiler", "Commands")];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ReservedEntityName(0, "info".into()),
                ValidationError::ReservedEntityName(1, "commands".into()),
            ]
        );
    }

    #[test]
    fn test_id_like_entity_names() {
        let mut config = GatewayConfig::default();
        config.entities = vec![entity("thermostat", "hc1"), entity("mixer", "3"), entity("mixer", "hc")];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::AmbiguousEntityName(0, "hc1".into()),
                ValidationError::AmbiguousEntityName(1, "3".into()),
            ]
        );
    }

    #[test]
    fn test_entity_checks() {
        let mut config = GatewayConfig::default();
        config.entities = vec![
            entity("boiler", "temp"),
            entity("Boiler", "TEMP"),
            entity("hc1", "mode"),
            entity("", "x"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateEntity(1, "boiler".into(), "temp".into()),
                ValidationError::AmbiguousDevice(2, "hc1".into()),
                ValidationError::EmptyEntity(3),
            ]
        );
    }
}
