//! Domain traits - Abstractions for infrastructure implementations

pub mod backends;
pub mod bot;
pub mod flags;

pub use backends::{FactSource, RconConnection, RconConnector};
pub use bot::{BotInfo, ChatGateway};
pub use flags::FeatureFlags;
