//! Discord adapter
//!
//! Holds gateway shards open and forwards every MESSAGE_CREATE the bot can
//! see into a queue drained by `poll_messages`. Replies and role lookups go
//! through the HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use twilight_gateway::{self as gateway, Config, Event, EventTypeFlags, Intents, Shard, StreamExt};
use twilight_http::client::ClientBuilder;
use twilight_http::error::ErrorType;
use twilight_http::Client as HttpClient;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};
use twilight_model::id::Id;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, RoleSet};
use crate::domain::traits::{BotInfo, ChatGateway};

/// Longest message Discord accepts
const MAX_CONTENT_CHARS: usize = 2000;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Channels the bot answers in; empty means every channel it can read
#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    allowed: Vec<String>,
}

impl ChannelFilter {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn accepts(&self, channel_id: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|c| c == channel_id)
    }
}

/// Discord bot adapter
pub struct DiscordAdapter {
    token: String,
    http: Arc<HttpClient>,
    info: BotInfo,
    filter: Arc<ChannelFilter>,
    rx: Mutex<Option<UnboundedReceiver<InboundMessage>>>,
}

impl DiscordAdapter {
    pub fn new(token: impl Into<String>, channels: Vec<String>) -> Self {
        let token = token.into();
        let http = ClientBuilder::new()
            .token(token.clone())
            .timeout(HTTP_TIMEOUT)
            .build();

        Self {
            token,
            http: Arc::new(http),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "otterbot".to_string(),
                username: "otterbot".to_string(),
            },
            filter: Arc::new(ChannelFilter::new(channels)),
            rx: Mutex::new(None),
        }
    }

    /// Fetch bot identity so the bot can ignore its own messages
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        let me = self
            .http
            .current_user()
            .await
            .map_err(http_error)?
            .model()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        self.info = BotInfo {
            id: me.id.to_string(),
            name: me.name.clone(),
            username: me.name,
        };
        Ok(())
    }
}

/// Forward guild and DM messages from one shard until the queue closes
async fn shard_runner(mut shard: Shard, tx: UnboundedSender<InboundMessage>, filter: Arc<ChannelFilter>) {
    let shard_id = shard.id().number();
    tracing::info!("Shard {} started", shard_id);

    let wanted = EventTypeFlags::READY | EventTypeFlags::MESSAGE_CREATE;
    while let Some(item) = shard.next_event(wanted).await {
        match item {
            Ok(Event::Ready(ready)) => {
                tracing::info!("Shard {} ready as {} ({})", shard_id, ready.user.name, ready.user.id);
            }
            Ok(Event::MessageCreate(msg)) => {
                let channel_id = msg.channel_id.to_string();
                if !filter.accepts(&channel_id) {
                    continue;
                }

                let guild_id = msg.guild_id.map(|g| g.to_string()).unwrap_or_default();
                let inbound = InboundMessage::new(msg.author.id.to_string(), channel_id, guild_id, msg.content.clone())
                    .with_id(msg.id.to_string());
                if tx.send(inbound).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Shard {} failed to receive event: {}", shard_id, e),
        }
    }

    tracing::warn!("Shard {} event loop ended", shard_id);
}

#[async_trait]
impl ChatGateway for DiscordAdapter {
    async fn start(&self) -> Result<(), BotError> {
        let (tx, rx) = unbounded_channel();
        *self.rx.lock().await = Some(rx);

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::DIRECT_MESSAGES | Intents::MESSAGE_CONTENT,
        );
        let shards = gateway::create_recommended(&self.http, config, |_, builder| builder.build())
            .await
            .map_err(|e| BotError::Network(format!("failed to create shards: {}", e)))?;

        tracing::info!(
            "Starting Discord bot as {} ({}) on {} shards",
            self.info.username,
            self.info.id,
            shards.len()
        );

        for shard in shards {
            tokio::spawn(shard_runner(shard, tx.clone(), self.filter.clone()));
        }
        Ok(())
    }

    async fn poll_messages(&self) -> Result<Vec<InboundMessage>, BotError> {
        let mut guard = self.rx.lock().await;
        let Some(rx) = guard.as_mut() else {
            return Err(BotError::Closed);
        };

        let Some(first) = rx.recv().await else {
            return Err(BotError::Closed);
        };
        let mut batch = vec![first];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }
        Ok(batch)
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, BotError> {
        let content = outgoing_content(text)?;
        let channel = parse_id::<ChannelMarker>(channel_id)?;

        tracing::debug!("Sending to {}: {}", channel_id, content);
        let sent = self
            .http
            .create_message(channel)
            .content(content)
            .await
            .map_err(http_error)?
            .model()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(sent.id.to_string())
    }

    async fn member_roles(&self, guild_id: &str, user_id: &str) -> Result<RoleSet, BotError> {
        if guild_id.is_empty() {
            return Ok(RoleSet::empty());
        }
        let guild = parse_id::<GuildMarker>(guild_id)?;
        let user = parse_id::<UserMarker>(user_id)?;

        let member = self
            .http
            .guild_member(guild, user)
            .await
            .map_err(http_error)?
            .model()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;
        let roles = self
            .http
            .roles(guild)
            .await
            .map_err(http_error)?
            .model()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        let guild_roles: Vec<(Id<RoleMarker>, String)> =
            roles.into_iter().map(|role| (role.id, role.name)).collect();
        Ok(resolve_role_names(&member.roles, &guild_roles))
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

fn http_error(e: twilight_http::Error) -> BotError {
    match e.kind() {
        ErrorType::Response { status, body, .. } => BotError::Api {
            status: status.get(),
            body: String::from_utf8_lossy(body).into_owned(),
        },
        _ => BotError::Network(e.to_string()),
    }
}

fn parse_id<T>(raw: &str) -> Result<Id<T>, BotError> {
    raw.parse::<u64>()
        .ok()
        .and_then(Id::new_checked)
        .ok_or_else(|| BotError::InvalidMessage(format!("invalid Discord id {:?}", raw)))
}

/// Role names for the member's role ids, in the member's order
fn resolve_role_names(member_roles: &[Id<RoleMarker>], guild_roles: &[(Id<RoleMarker>, String)]) -> RoleSet {
    member_roles
        .iter()
        .filter_map(|id| guild_roles.iter().find(|(role_id, _)| role_id == id))
        .map(|(_, name)| name.clone())
        .collect()
}

/// Discord rejects empty messages and truncates nothing itself
fn outgoing_content(text: &str) -> Result<&str, BotError> {
    if text.is_empty() {
        return Err(BotError::InvalidMessage("Discord rejects empty messages".to_string()));
    }
    Ok(truncate_content(text))
}

fn truncate_content(text: &str) -> &str {
    match text.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: u64, name: &str) -> (Id<RoleMarker>, String) {
        (Id::new(id), name.to_string())
    }

    #[test]
    fn role_names_follow_member_order() {
        let guild = vec![role(1, "everyone"), role(2, "ops"), role(3, "cat-facts")];
        let member = vec![Id::new(3), Id::new(9), Id::new(2)];

        let roles = resolve_role_names(&member, &guild);
        assert_eq!(roles.names(), &["cat-facts".to_string(), "ops".to_string()]);
    }

    #[test]
    fn empty_filter_accepts_every_channel() {
        let filter = ChannelFilter::default();
        assert!(filter.accepts("111"));
        assert!(filter.accepts("222"));
    }

    #[test]
    fn filter_limits_to_listed_channels() {
        let filter = ChannelFilter::new(vec!["111".to_string()]);
        assert!(filter.accepts("111"));
        assert!(!filter.accepts("222"));
    }

    #[test]
    fn ids_must_be_nonzero_numbers() {
        assert_eq!(parse_id::<ChannelMarker>("42").unwrap(), Id::new(42));
        assert!(matches!(parse_id::<ChannelMarker>("0"), Err(BotError::InvalidMessage(_))));
        assert!(matches!(parse_id::<ChannelMarker>("general"), Err(BotError::InvalidMessage(_))));
    }

    #[test]
    fn long_replies_are_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_CONTENT_CHARS + 5);
        assert_eq!(truncate_content(&long).chars().count(), MAX_CONTENT_CHARS);
        assert_eq!(truncate_content("pong"), "pong");
    }

    #[test]
    fn empty_reply_is_rejected_locally() {
        assert!(matches!(outgoing_content(""), Err(BotError::InvalidMessage(_))));
        assert_eq!(outgoing_content("pong").unwrap(), "pong");
    }
}
