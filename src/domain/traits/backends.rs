use async_trait::async_trait;

use crate::application::errors::BackendError;

/// Source of cat facts
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn fetch(&self) -> Result<String, BackendError>;
}

/// Opens RCON sessions against a game server
#[async_trait]
pub trait RconConnector: Send + Sync {
    async fn connect(
        &self,
        address: &str,
        password: &str,
    ) -> Result<Box<dyn RconConnection>, BackendError>;
}

/// An authenticated RCON session; closed when dropped
#[async_trait]
pub trait RconConnection: Send {
    async fn send_command(&mut self, command: &str) -> Result<String, BackendError>;
}
