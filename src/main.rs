use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::task::JoinSet;

use otterbot::application::errors::BotError;
use otterbot::application::messaging::CommandRouter;
use otterbot::application::services::{default_commands, Backends};
use otterbot::domain::traits::ChatGateway;
use otterbot::infrastructure::adapters::{ConsoleAdapter, DiscordAdapter};
use otterbot::infrastructure::catfact::HttpFactClient;
use otterbot::infrastructure::config::Config;
use otterbot::infrastructure::flags::ConfigFlags;
use otterbot::infrastructure::rcon::TcpRconConnector;

#[derive(Parser)]
#[command(name = "otterbot")]
#[command(about = "A small chat command bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Discord bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Print a default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if !run_bot(&cli.config, cli.token) {
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("otterbot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(),
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Config {
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(token) = token_override {
        config = config.with_discord_token(token);
    }

    config
}

fn run_bot(config_path: &str, token_override: Option<String>) -> bool {
    let config = load_config(config_path, token_override);
    tracing::info!("Starting {} with prefix {:?}", config.bot.name, config.bot.prefix);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return false;
        }
    };

    rt.block_on(async {
        let facts = match HttpFactClient::new(
            &config.fact_service.url,
            Duration::from_secs(config.fact_service.timeout_seconds),
        ) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to build fact client: {}", e);
                return false;
            }
        };
        let backends = Backends {
            facts: Arc::new(facts),
            rcon: Arc::new(TcpRconConnector::new(Duration::from_secs(
                config.minecraft.timeout_seconds,
            ))),
        };
        if config.minecraft.address.is_empty() {
            tracing::warn!("MCSERVERADDR not set, minecraft commands will fail");
        }

        let gateway: Arc<dyn ChatGateway> = match (config.discord_token(), &config.adapters.discord) {
            (Some(token), Some(discord)) => {
                let mut bot = DiscordAdapter::new(token, discord.channels.clone());
                if let Err(e) = bot.fetch_bot_info().await {
                    tracing::error!("Failed to fetch bot info: {}", e);
                    return false;
                }
                Arc::new(bot)
            }
            _ => {
                let console = config.adapters.console.clone();
                let (user_id, roles) = console
                    .map(|c| (c.user_id, c.roles))
                    .unwrap_or_else(|| ("console-user".to_string(), Vec::new()));
                Arc::new(ConsoleAdapter::new(user_id, roles))
            }
        };

        let table = default_commands(&config.command_settings(), &backends);
        tracing::info!("Registered {} commands", table.len());

        let router = CommandRouter::new(
            config.bot.prefix.clone(),
            table,
            gateway.clone(),
            Arc::new(ConfigFlags::new(config.flags.clone())),
        )
        .with_denied_text(config.commands.denied_text.clone());
        for line in router.help_lines() {
            tracing::info!("  {}", line);
        }

        run_message_loop(gateway, Arc::new(router)).await
    })
}

/// Receive messages until shutdown, dispatching each on its own task
async fn run_message_loop(gateway: Arc<dyn ChatGateway>, router: Arc<CommandRouter>) -> bool {
    if let Err(e) = gateway.start().await {
        tracing::error!("Failed to start gateway: {}", e);
        return false;
    }

    let mut in_flight = JoinSet::new();
    tracing::info!("Starting message loop...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            polled = gateway.poll_messages() => match polled {
                Ok(messages) => {
                    if !messages.is_empty() {
                        tracing::debug!("Received {} messages", messages.len());
                    }
                    for message in messages {
                        let router = router.clone();
                        in_flight.spawn(async move { router.handle(message).await });
                    }
                }
                Err(BotError::Closed) => {
                    tracing::info!("Gateway closed");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to get messages: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }

        while let Some(done) = in_flight.try_join_next() {
            if let Err(e) = done {
                tracing::error!("Dispatch task failed: {}", e);
            }
        }
    }

    while let Some(done) = in_flight.join_next().await {
        if let Err(e) = done {
            tracing::error!("Dispatch task failed: {}", e);
        }
    }
    true
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render config: {}", e),
    }
}
