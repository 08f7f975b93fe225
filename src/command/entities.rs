//! In-memory device entities exposed as commands.
//!
//! Each configured entity becomes a `{device}/{name}` command: without a
//! `value` in the input it reads, with one it writes.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};

use crate::command::registry::{CommandContext, CommandRegistry, RESERVED_COMMANDS, SYSTEM_DEVICE};
use crate::command::{Document, ResultCode};
use crate::config::schema::EntityConfig;

#[derive(Debug, Clone)]
struct Entity {
    value: Value,
    writable: bool,
    admin_only: bool,
}

/// Thread-safe entity value store shared by the entity command handlers.
#[derive(Clone, Default)]
pub struct EntityStore {
    inner: Arc<DashMap<(String, String), Entity>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store seeded from configuration.
    pub fn from_config(entities: &[EntityConfig]) -> Self {
        let store = Self::new();
        for e in entities {
            store.insert(&e.device, &e.name, e.value.clone(), e.writable, e.admin_only);
        }
        tracing::info!(count = store.len(), "Loaded device entities");
        store
    }

    pub fn insert(&self, device: &str, name: &str, value: Value, writable: bool, admin_only: bool) {
        self.inner.insert(
            key(device, name),
            Entity {
                value,
                writable,
                admin_only,
            },
        );
    }

    pub fn get(&self, device: &str, name: &str) -> Option<Value> {
        self.inner.get(&key(device, name)).map(|e| e.value.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All entity values of one device.
    pub fn device_values(&self, device: &str) -> Document {
        let device = device.to_lowercase();
        self.inner
            .iter()
            .filter(|r| r.key().0 == device)
            .map(|r| (r.key().1.clone(), r.value().value.clone()))
            .collect()
    }

    /// Register one command per entity plus an `info` command per device.
    pub fn register_commands(&self, registry: &mut CommandRegistry) {
        let keys: Vec<(String, String)> = self
            .inner
            .iter()
            .map(|r| r.key().clone())
            .filter(|(device, name)| {
                let reserved = device == SYSTEM_DEVICE || RESERVED_COMMANDS.contains(&name.as_str());
                if reserved {
                    tracing::warn!(device = %device, entity = %name, "Entity shadows a built-in command, not registered");
                }
                !reserved
            })
            .collect();

        for (device, name) in &keys {
            let store = self.clone();
            let (d, n) = (device.clone(), name.clone());
            registry.register(device, name, &format!("{} entity", name), false, move |ctx, output| {
                store.handle(&d, &n, ctx, output)
            });
        }

        let mut devices: Vec<&String> = keys.iter().map(|(d, _)| d).collect();
        devices.sort();
        devices.dedup();
        for device in devices {
            let store = self.clone();
            let d = device.clone();
            registry.register(device, "info", "list entity values", false, move |_, output| {
                *output = store.device_values(&d);
                ResultCode::Ok
            });
        }
    }

    fn handle(
        &self,
        device: &str,
        name: &str,
        ctx: &CommandContext<'_>,
        output: &mut Document,
    ) -> ResultCode {
        let Some(mut entity) = self.inner.get_mut(&key(device, name)) else {
            output.insert("message".into(), json!(format!("unknown entity {}", name)));
            return ResultCode::NotFound;
        };

        let Some(new_value) = ctx.input.get("value") else {
            output.insert("value".into(), entity.value.clone());
            output.insert("writable".into(), json!(entity.writable));
            return ResultCode::Ok;
        };

        if !entity.writable {
            output.insert("message".into(), json!("entity is read-only"));
            return ResultCode::Fail;
        }
        if entity.admin_only && !ctx.is_admin {
            output.insert("message".into(), json!("non-authenticated"));
            return ResultCode::NotAllowed;
        }

        tracing::info!(device, entity = name, value = %new_value, "Entity updated");
        entity.value = new_value.clone();
        ResultCode::Ok
    }
}

fn key(device: &str, name: &str) -> (String, String) {
    (device.to_lowercase(), name.to_lowercase())
}
