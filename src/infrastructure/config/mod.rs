//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::{CommandSettings, CATFACT_FLAG, MINECRAFT_FLAG};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub commands: CommandsConfig,
    pub fact_service: FactServiceConfig,
    pub minecraft: MinecraftConfig,
    pub adapters: AdaptersConfig,
    pub flags: BTreeMap<String, FlagRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommandsConfig {
    pub test_delay_ms: u64,
    pub relationships_text: String,
    pub denied_text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FactServiceConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MinecraftConfig {
    pub address: String,
    pub password: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub discord: Option<DiscordConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub enabled: bool,
    pub token: Option<String>,
    /// Channel ids to listen on; empty listens everywhere the bot can read
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    #[serde(default = "default_console_user")]
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Targeting rule for one feature flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FlagRule {
    pub enabled: bool,
    /// Decision for users matched by neither `users` nor `roles`
    pub default: bool,
    pub users: Vec<String>,
    pub roles: Vec<String>,
}

fn default_console_user() -> String {
    "console-user".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "otterbot".to_string(),
            prefix: "!".to_string(),
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            test_delay_ms: 3000,
            relationships_text: "some interesting otter things".to_string(),
            denied_text: "Command not allowed".to_string(),
        }
    }
}

impl Default for FactServiceConfig {
    fn default() -> Self {
        Self {
            url: crate::infrastructure::catfact::DEFAULT_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for MinecraftConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            password: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut flags = BTreeMap::new();
        flags.insert(
            CATFACT_FLAG.to_string(),
            FlagRule {
                enabled: true,
                default: false,
                users: Vec::new(),
                roles: vec!["cat-facts".to_string()],
            },
        );
        flags.insert(
            MINECRAFT_FLAG.to_string(),
            FlagRule {
                enabled: true,
                default: false,
                users: Vec::new(),
                roles: vec!["minecraft-admin".to_string()],
            },
        );

        Self {
            bot: BotConfig::default(),
            commands: CommandsConfig::default(),
            fact_service: FactServiceConfig::default(),
            minecraft: MinecraftConfig::default(),
            adapters: AdaptersConfig {
                discord: Some(DiscordConfig {
                    enabled: false,
                    token: None,
                    channels: Vec::new(),
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                    user_id: default_console_user(),
                    roles: Vec::new(),
                }),
            },
            flags,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse_yaml(&content)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_yaml(content)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        Config::default().with_env_overrides()
    }

    /// Apply process environment on top of file values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            self = self.with_discord_token(token);
        }

        if let Some(channels) = lookup("DISCORD_CHANNELS") {
            if let Some(ref mut discord) = self.adapters.discord {
                discord.channels = channels
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
            }
        }

        if let Some(prefix) = lookup("BOT_PREFIX").filter(|p| !p.is_empty()) {
            self.bot.prefix = prefix;
        }

        if let Some(addr) = lookup("MCSERVERADDR") {
            self.minecraft.address = addr;
        }

        if let Some(pass) = lookup("MCSERVERPASS") {
            self.minecraft.password = pass;
        }

        if let Some(url) = lookup("CATFACT_URL") {
            self.fact_service.url = url;
        }

        self
    }

    /// Enable the Discord adapter with `token`, creating its section if absent
    pub fn with_discord_token(mut self, token: impl Into<String>) -> Self {
        let discord = self.adapters.discord.get_or_insert_with(|| DiscordConfig {
            enabled: true,
            token: None,
            channels: Vec::new(),
        });
        discord.token = Some(token.into());
        discord.enabled = true;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.fact_service.url.is_empty() {
            return Err(ConfigError::MissingField("fact-service.url".to_string()));
        }
        if let Some(discord) = &self.adapters.discord {
            if discord.enabled && discord.token.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::MissingField("adapters.discord.token".to_string()));
            }
            if let Some(bad) = discord.channels.iter().find(|c| c.parse::<u64>().is_err()) {
                return Err(ConfigError::InvalidValue(format!(
                    "adapters.discord.channels: {:?} is not a channel id",
                    bad
                )));
            }
        }
        Ok(())
    }

    /// Discord token, if the Discord adapter is enabled
    pub fn discord_token(&self) -> Option<&str> {
        self.adapters
            .discord
            .as_ref()
            .filter(|d| d.enabled)
            .and_then(|d| d.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            test_delay: Duration::from_millis(self.commands.test_delay_ms),
            relationships_text: self.commands.relationships_text.clone(),
            minecraft_address: self.minecraft.address.clone(),
            minecraft_password: self.minecraft.password.clone(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
