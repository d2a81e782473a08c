use chrono::{DateTime, Utc};

/// A chat message as delivered by a gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: String,
    pub author_id: String,
    pub channel_id: String,
    pub guild_id: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(
        author_id: impl Into<String>,
        channel_id: impl Into<String>,
        guild_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author_id: author_id.into(),
            channel_id: channel_id.into(),
            guild_id: guild_id.into(),
            content: content.into(),
            received_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A message that passed the sigil check, with the sigil removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub author_id: String,
    pub channel_id: String,
    pub guild_id: String,
    /// Command text without the leading sigil
    pub text: String,
}

impl CommandRequest {
    pub fn from_message(message: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            author_id: message.author_id.clone(),
            channel_id: message.channel_id.clone(),
            guild_id: message.guild_id.clone(),
            text: text.into(),
        }
    }
}
