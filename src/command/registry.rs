//! Path-keyed command registry.
//!
//! # Responsibilities
//! - Resolve `{device}` and `{command}` from the request path or the input
//! - Enforce per-command privilege requirements
//! - Invoke the registered handler and narrow output to an attribute
//!
//! # Design Decisions
//! - Registry is built at startup and read-only afterwards (shared via Arc)
//! - Command name falls back to `input.cmd`, then `input.entity`, then `info`
//! - Path ids are injected into the input as `id` unless already present
//! - An attribute segment is read-only: calls with input are refused up front

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};

use crate::command::entities::EntityStore;
use crate::command::path::{CommandPath, PathError};
use crate::command::{CommandEngine, Document, ResultCode};
use crate::config::GatewayConfig;

/// Name of the built-in device.
pub const SYSTEM_DEVICE: &str = "system";

/// Command used when neither the path nor the input names one.
pub const DEFAULT_COMMAND: &str = "info";

/// Command names the registry answers itself.
pub const RESERVED_COMMANDS: [&str; 2] = [DEFAULT_COMMAND, "commands"];

/// Per-call view handed to a command handler.
#[derive(Debug)]
pub struct CommandContext<'a> {
    pub input: &'a Document,
    pub id: Option<u32>,
    pub is_admin: bool,
}

pub type CommandHandler =
    Arc<dyn Fn(&CommandContext<'_>, &mut Document) -> ResultCode + Send + Sync>;

struct CommandEntry {
    description: String,
    admin_only: bool,
    handler: CommandHandler,
}

/// A `CommandEngine` that dispatches on `{device}/{command}`.
pub struct CommandRegistry {
    base_path: String,
    devices: BTreeMap<String, BTreeMap<String, CommandEntry>>,
    started_at: Instant,
}

impl CommandRegistry {
    /// Create a registry serving paths under `base_path`, with the
    /// built-in `system` device.
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut registry = Self {
            base_path: base_path.into(),
            devices: BTreeMap::new(),
            started_at: Instant::now(),
        };
        registry.register(SYSTEM_DEVICE, "echo", "return the input", true, |ctx, output| {
            output.extend(ctx.input.iter().map(|(k, v)| (k.clone(), v.clone())));
            ResultCode::Ok
        });
        registry
    }

    /// Registry for a configuration: system device plus configured entities.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut registry = Self::new(config.api.base_path.clone());
        EntityStore::from_config(&config.entities).register_commands(&mut registry);
        registry
    }

    /// Register a handler for `device/command`. Names are case-insensitive.
    pub fn register<F>(
        &mut self,
        device: &str,
        command: &str,
        description: &str,
        admin_only: bool,
        handler: F,
    ) where
        F: Fn(&CommandContext<'_>, &mut Document) -> ResultCode + Send + Sync + 'static,
    {
        let entry = CommandEntry {
            description: description.to_string(),
            admin_only,
            handler: Arc::new(handler),
        };
        self.devices
            .entry(device.to_lowercase())
            .or_default()
            .insert(command.to_lowercase(), entry);
    }

    /// Registered device names, sorted.
    pub fn devices(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Map of device to `{command: description}`.
    pub fn describe(&self) -> Document {
        self.devices
            .iter()
            .map(|(device, commands)| (device.clone(), Value::Object(describe_commands(commands))))
            .collect()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn system_info(&self, output: &mut Document) {
        output.insert("name".into(), json!(env!("CARGO_PKG_NAME")));
        output.insert("version".into(), json!(env!("CARGO_PKG_VERSION")));
        output.insert("uptime_secs".into(), json!(self.started_at.elapsed().as_secs()));
        output.insert("devices".into(), json!(self.devices()));
    }
}

fn describe_commands(commands: &BTreeMap<String, CommandEntry>) -> Document {
    commands
        .iter()
        .map(|(name, entry)| (name.clone(), Value::String(entry.description.clone())))
        .collect()
}

fn set_message(output: &mut Document, message: impl Into<String>) {
    output.insert("message".into(), Value::String(message.into()));
}

fn command_from_input(input: &Document) -> Option<String> {
    ["cmd", "entity"]
        .iter()
        .find_map(|key| input.get(*key).and_then(Value::as_str))
        .map(str::to_lowercase)
}

impl CommandEngine for CommandRegistry {
    fn process(
        &self,
        path: &str,
        is_admin: bool,
        input: &Document,
        output: &mut Document,
    ) -> ResultCode {
        let parsed = match CommandPath::parse(&self.base_path, path) {
            Ok(p) => p,
            Err(e) => {
                set_message(output, e.to_string());
                return match e {
                    PathError::OutsideBase => ResultCode::NotFound,
                    PathError::MissingDevice | PathError::TooManySegments => ResultCode::Fail,
                };
            }
        };

        // Attribute paths only narrow a read; refuse them before a write can land.
        if let Some(attribute) = &parsed.attribute {
            if !input.is_empty() {
                set_message(output, format!("attribute {} cannot be written", attribute));
                return ResultCode::Fail;
            }
        }

        let command = parsed
            .command
            .clone()
            .or_else(|| command_from_input(input))
            .unwrap_or_else(|| DEFAULT_COMMAND.to_string());

        tracing::debug!(
            device = %parsed.device,
            command = %command,
            id = ?parsed.id,
            is_admin,
            "Resolving command"
        );

        let Some(commands) = self.devices.get(&parsed.device) else {
            set_message(output, format!("unknown device {}", parsed.device));
            return ResultCode::NotFound;
        };

        let code = match commands.get(&command) {
            Some(entry) => {
                if entry.admin_only && !is_admin {
                    set_message(output, "non-authenticated");
                    return ResultCode::NotAllowed;
                }

                let input = match parsed.id {
                    Some(id) if !input.contains_key("id") => {
                        let mut owned = input.clone();
                        owned.insert("id".into(), json!(id));
                        Cow::Owned(owned)
                    }
                    _ => Cow::Borrowed(input),
                };
                let ctx = CommandContext {
                    input: &*input,
                    id: parsed.id,
                    is_admin,
                };
                (entry.handler)(&ctx, output)
            }
            None if command == DEFAULT_COMMAND => {
                if parsed.device == SYSTEM_DEVICE {
                    self.system_info(output);
                } else {
                    *output = describe_commands(commands);
                }
                ResultCode::Ok
            }
            None if parsed.device == SYSTEM_DEVICE && command == RESERVED_COMMANDS[1] => {
                *output = self.describe();
                ResultCode::Ok
            }
            None => {
                set_message(
                    output,
                    format!("unknown command {} for device {}", command, parsed.device),
                );
                return ResultCode::NotFound;
            }
        };

        match parsed.attribute {
            Some(attribute) if code.is_ok() => match output.remove(&attribute) {
                Some(value) => {
                    output.clear();
                    output.insert(attribute, value);
                    ResultCode::Ok
                }
                None => {
                    output.clear();
                    set_message(output, format!("unknown attribute {}", attribute));
                    ResultCode::NotFound
                }
            },
            _ => code,
        }
    }
}
