//! Message parser - Decides whether an inbound message is a command

use crate::domain::entities::{CommandRequest, InboundMessage};

/// Recognizes commands by their leading sigil
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse an inbound message into a command request
    ///
    /// Returns `None` for the bot's own messages and for text without the
    /// sigil. Exactly one leading sigil is removed.
    pub fn parse(&self, message: &InboundMessage, self_id: &str) -> Option<CommandRequest> {
        if message.author_id == self_id {
            return None;
        }

        let text = message.content.strip_prefix(self.command_prefix.as_str())?;
        Some(CommandRequest::from_message(message, text))
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new("!")
    }
}
