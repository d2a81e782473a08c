//! Built-in command handlers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::errors::{BackendError, CommandError};
use crate::domain::entities::{CommandHandler, CommandResult};
use crate::domain::traits::{FactSource, RconConnector};

/// Replies with the same text every time
pub struct StaticReply {
    text: String,
}

impl StaticReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl CommandHandler for StaticReply {
    async fn run(&self, _args: &str) -> CommandResult {
        Ok(self.text.clone())
    }
}

/// Waits before replying, to simulate a slow command
pub struct DelayedReply {
    delay: Duration,
    text: String,
}

impl DelayedReply {
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for DelayedReply {
    async fn run(&self, _args: &str) -> CommandResult {
        tokio::time::sleep(self.delay).await;
        Ok(self.text.clone())
    }
}

/// Joins the space-separated words after the command with `-`
///
/// The first space-separated token is dropped, so `"split a b c"` gives
/// `"a-b-c"` and a bare `"split"` gives an empty reply.
pub struct SplitJoin;

#[async_trait]
impl CommandHandler for SplitJoin {
    async fn run(&self, args: &str) -> CommandResult {
        Ok(args.split(' ').skip(1).collect::<Vec<_>>().join("-"))
    }
}

/// Fetches a fact from the fact service
pub struct CatFact {
    source: Arc<dyn FactSource>,
}

impl CatFact {
    pub fn new(source: Arc<dyn FactSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl CommandHandler for CatFact {
    async fn run(&self, _args: &str) -> CommandResult {
        self.source
            .fetch()
            .await
            .map_err(CommandError::FactUnavailable)
    }
}

/// Forwards a console command to the game server over RCON
///
/// A fresh connection is opened per invocation and dropped when the
/// handler returns.
pub struct MinecraftCommand {
    connector: Arc<dyn RconConnector>,
    address: String,
    password: String,
}

impl MinecraftCommand {
    pub fn new(
        connector: Arc<dyn RconConnector>,
        address: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            address: address.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for MinecraftCommand {
    async fn run(&self, args: &str) -> CommandResult {
        if self.address.is_empty() {
            return Err(BackendError::NotConfigured("minecraft.address").into());
        }

        tracing::debug!("Connecting to minecraft server at {}", self.address);
        let mut conn = self.connector.connect(&self.address, &self.password).await?;

        let response = conn.send_command(args).await?;
        Ok(response)
    }
}
