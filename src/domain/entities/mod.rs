//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod message;
pub mod roles;

pub use command::{Command, CommandHandler, CommandResult, CommandTable};
pub use message::{CommandRequest, InboundMessage};
pub use roles::RoleSet;
