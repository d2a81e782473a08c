use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, RoleSet};

/// Chat gateway - abstraction for messaging platform adapters
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Prepare the adapter (identity lookup, cursors)
    async fn start(&self) -> Result<(), BotError>;

    /// Wait for the next batch of inbound messages
    async fn poll_messages(&self) -> Result<Vec<InboundMessage>, BotError>;

    /// Send a message to a channel, returning the platform message id
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, BotError>;

    /// Resolve the role names of a member in a guild
    async fn member_roles(&self, guild_id: &str, user_id: &str) -> Result<RoleSet, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
