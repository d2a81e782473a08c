use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::CommandError;

/// Result of running a command handler: reply text or a user-facing error
pub type CommandResult = Result<String, CommandError>;

/// Executes one command given the text after its prefix
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, args: &str) -> CommandResult;
}

/// One row of the command table
#[derive(Clone)]
pub struct Command {
    /// Name recorded in the dispatch trace
    pub name: String,
    pub prefix: String,
    pub description: Option<String>,
    /// Feature flag that must evaluate true before the handler runs
    pub required_flag: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new<H>(prefix: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        let prefix = prefix.into();
        Self {
            name: prefix.trim().to_string(),
            prefix,
            description: None,
            required_flag: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.required_flag = Some(flag.into());
        self
    }

    /// Returns the text after the prefix if `input` starts with it
    pub fn matches<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.strip_prefix(self.prefix.as_str())
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("required_flag", &self.required_flag)
            .finish_non_exhaustive()
    }
}

/// Ordered command table; the first matching prefix wins
#[derive(Default, Clone, Debug)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn with(mut self, command: Command) -> Self {
        self.register(command);
        self
    }

    /// Finds the first command whose prefix matches, with the remaining text
    pub fn find<'a>(&self, input: &'a str) -> Option<(&Command, &'a str)> {
        self.commands
            .iter()
            .find_map(|cmd| cmd.matches(input).map(|rest| (cmd, rest)))
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
