//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, RoleSet};
use crate::domain::traits::{BotInfo, ChatGateway};

const CONSOLE_CHANNEL: &str = "console";
const CONSOLE_GUILD: &str = "console";

/// Console bot adapter for local development
///
/// Each stdin line is a message from a single configured user.
pub struct ConsoleAdapter {
    info: BotInfo,
    user_id: String,
    roles: RoleSet,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "otterbot".to_string(),
                username: "console".to_string(),
            },
            user_id: user_id.into(),
            roles: RoleSet::new(roles),
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl ChatGateway for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode) as user {}", self.user_id);
        Ok(())
    }

    async fn poll_messages(&self) -> Result<Vec<InboundMessage>, BotError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await? {
            Some(line) if !line.trim().is_empty() => Ok(vec![InboundMessage::new(
                &self.user_id,
                CONSOLE_CHANNEL,
                CONSOLE_GUILD,
                line.trim_end(),
            )]),
            Some(_) => Ok(Vec::new()),
            None => Err(BotError::Closed),
        }
    }

    async fn send_message(&self, _channel_id: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    async fn member_roles(&self, _guild_id: &str, user_id: &str) -> Result<RoleSet, BotError> {
        if user_id == self.user_id {
            Ok(self.roles.clone())
        } else {
            Ok(RoleSet::empty())
        }
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
