//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: Gateway, backend, command and config errors
//! - Messaging: Message parsing, dispatch tracing, command routing
//! - Services: Built-in command handlers and the default table

pub mod errors;
pub mod messaging;
pub mod services;
