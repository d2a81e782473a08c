//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Flags: Config-backed feature flag evaluation
//! - Catfact: HTTP fact service client
//! - Rcon: Game server console client
//! - Adapters: Platform integrations (Discord, console)

pub mod adapters;
pub mod catfact;
pub mod config;
pub mod flags;
pub mod rcon;
