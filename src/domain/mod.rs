//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Inbound messages, role sets, the command table
//! - Traits: Abstractions for infrastructure (ChatGateway, FeatureFlags, backends)

pub mod entities;
pub mod traits;
