use super::{BusConnection, BusError, PoppitCommand, SlackLinerMessage};
use crate::config::ListNames;
use std::sync::Arc;

/// Enqueues work for the command runner. Fire-and-forget: no acknowledgement is awaited.
pub trait CommandEmitter {
    fn emit_execution_request(&self, command: &PoppitCommand) -> Result<(), BusError>;
}

/// Enqueues messages for the channel poster. Fire-and-forget.
pub trait NotificationEmitter {
    fn emit_notification(&self, message: &SlackLinerMessage) -> Result<(), BusError>;
}

pub struct RedisEmitter {
    conn: Arc<BusConnection>,
    commands_list: String,
    messages_list: String,
}

impl RedisEmitter {
    pub fn new(conn: Arc<BusConnection>, lists: &ListNames) -> Self {
        Self {
            conn,
            commands_list: lists.poppit_commands.clone(),
            messages_list: lists.slackliner_messages.clone(),
        }
    }
}

impl CommandEmitter for RedisEmitter {
    fn emit_execution_request(&self, command: &PoppitCommand) -> Result<(), BusError> {
        let payload = serde_json::to_string(command).map_err(|source| BusError::Encode {
            what: "poppit command",
            source,
        })?;
        self.conn.push(&self.commands_list, &payload)
    }
}

impl NotificationEmitter for RedisEmitter {
    fn emit_notification(&self, message: &SlackLinerMessage) -> Result<(), BusError> {
        let payload = serde_json::to_string(message).map_err(|source| BusError::Encode {
            what: "slackliner message",
            source,
        })?;
        self.conn.push(&self.messages_list, &payload)
    }
}
