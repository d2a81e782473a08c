//! The default command table

use std::sync::Arc;
use std::time::Duration;

use super::handlers::{CatFact, DelayedReply, MinecraftCommand, SplitJoin, StaticReply};
use crate::domain::entities::{Command, CommandTable};
use crate::domain::traits::{FactSource, RconConnector};

pub const CATFACT_FLAG: &str = "catfact-command";
pub const MINECRAFT_FLAG: &str = "mc-commands";

/// Tunables for the built-in commands
#[derive(Debug, Clone)]
pub struct CommandSettings {
    pub test_delay: Duration,
    pub relationships_text: String,
    pub minecraft_address: String,
    pub minecraft_password: String,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            test_delay: Duration::from_secs(3),
            relationships_text: "some interesting otter things".to_string(),
            minecraft_address: String::new(),
            minecraft_password: String::new(),
        }
    }
}

/// External services the built-in commands call
#[derive(Clone)]
pub struct Backends {
    pub facts: Arc<dyn FactSource>,
    pub rcon: Arc<dyn RconConnector>,
}

/// Build the command table in match order
pub fn default_commands(settings: &CommandSettings, backends: &Backends) -> CommandTable {
    CommandTable::new()
        .with(Command::new("ping", StaticReply::new("pong")).with_description("Check the bot is alive"))
        .with(
            Command::new("test", DelayedReply::new(settings.test_delay, "test success"))
                .with_description("Reply after a simulated delay"),
        )
        .with(Command::new("split", SplitJoin).with_description("Join words with dashes"))
        .with(
            Command::new("catfact", CatFact::new(backends.facts.clone()))
                .with_description("Fetch a random cat fact")
                .with_flag(CATFACT_FLAG),
        )
        .with(
            Command::new("relationships", StaticReply::new(settings.relationships_text.clone()))
                .with_description("Otter facts"),
        )
        .with(
            Command::new(
                "mc ",
                MinecraftCommand::new(
                    backends.rcon.clone(),
                    settings.minecraft_address.clone(),
                    settings.minecraft_password.clone(),
                ),
            )
            .with_name("minecraft")
            .with_description("Run a command on the minecraft server")
            .with_flag(MINECRAFT_FLAG),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BackendError;
    use crate::domain::traits::RconConnection;
    use async_trait::async_trait;

    struct NoFacts;

    #[async_trait]
    impl FactSource for NoFacts {
        async fn fetch(&self) -> Result<String, BackendError> {
            Err(BackendError::Timeout)
        }
    }

    struct NoRcon;

    #[async_trait]
    impl RconConnector for NoRcon {
        async fn connect(
            &self,
            _address: &str,
            _password: &str,
        ) -> Result<Box<dyn RconConnection>, BackendError> {
            Err(BackendError::AuthFailed)
        }
    }

    fn table() -> CommandTable {
        let backends = Backends {
            facts: Arc::new(NoFacts),
            rcon: Arc::new(NoRcon),
        };
        default_commands(&CommandSettings::default(), &backends)
    }

    #[test]
    fn table_order_and_flags() {
        let table = table();
        let rows: Vec<(&str, Option<&str>)> = table
            .all()
            .map(|c| (c.prefix.as_str(), c.required_flag.as_deref()))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("ping", None),
                ("test", None),
                ("split", None),
                ("catfact", Some(CATFACT_FLAG)),
                ("relationships", None),
                ("mc ", Some(MINECRAFT_FLAG)),
            ]
        );
    }

    #[test]
    fn prefixes_match_loosely() {
        let table = table();
        assert_eq!(table.find("pingpong").unwrap().0.name, "ping");
        assert_eq!(table.find("testing").unwrap().0.name, "test");
        assert_eq!(table.find("mc say hi").unwrap().0.name, "minecraft");
        assert!(table.find("mc").is_none());
        assert!(table.find("Ping").is_none());
    }
}
