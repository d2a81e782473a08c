//! otterbot - a chat command bot with feature-flag gated commands

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::messaging::{CommandRouter, DispatchOutcome};
pub use infrastructure::config::Config;

#[cfg(test)]
pub(crate) mod test_support;
