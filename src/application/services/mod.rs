//! Application services - Built-in commands and the default command table

pub mod builtin;
pub mod handlers;

pub use builtin::{default_commands, Backends, CommandSettings, CATFACT_FLAG, MINECRAFT_FLAG};
