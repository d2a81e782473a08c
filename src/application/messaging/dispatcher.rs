//! Command router - Routes command messages to handlers and replies once

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use super::parser::MessageParser;
use super::trace::DispatchTrace;
use crate::domain::entities::{CommandRequest, CommandTable, InboundMessage, RoleSet};
use crate::domain::traits::{ChatGateway, FeatureFlags};

/// Reply sent when a gated command's flag evaluates false
pub const DENIED_TEXT: &str = "Command not allowed";

/// How a single dispatch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Own message or no sigil; nothing was done
    Ignored,
    /// Sigil present but no command matched; no reply
    Unrecognized,
    /// Flag check failed; the denial text was sent
    Denied,
    /// Handler succeeded and its text was sent
    Replied,
    /// Handler failed and its error text was sent
    Failed,
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DispatchOutcome::Ignored => "ignored",
            DispatchOutcome::Unrecognized => "unrecognized",
            DispatchOutcome::Denied => "denied",
            DispatchOutcome::Replied => "replied",
            DispatchOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Matches commands against an ordered table, gates them behind feature flags
/// and sends exactly one reply per recognized command
pub struct CommandRouter {
    parser: MessageParser,
    table: CommandTable,
    gateway: Arc<dyn ChatGateway>,
    flags: Arc<dyn FeatureFlags>,
    denied_text: String,
}

impl CommandRouter {
    pub fn new(
        prefix: impl Into<String>,
        table: CommandTable,
        gateway: Arc<dyn ChatGateway>,
        flags: Arc<dyn FeatureFlags>,
    ) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            table,
            gateway,
            flags,
            denied_text: DENIED_TEXT.to_string(),
        }
    }

    pub fn with_denied_text(mut self, text: impl Into<String>) -> Self {
        self.denied_text = text.into();
        self
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// One line per command: sigil, prefix and description
    pub fn help_lines(&self) -> Vec<String> {
        self.table
            .all()
            .map(|cmd| {
                let usage = format!("{}{}", self.parser.prefix(), cmd.prefix.trim_end());
                match (&cmd.description, &cmd.required_flag) {
                    (Some(desc), Some(flag)) => format!("{} - {} (flag: {})", usage, desc, flag),
                    (Some(desc), None) => format!("{} - {}", usage, desc),
                    (None, Some(flag)) => format!("{} (flag: {})", usage, flag),
                    (None, None) => usage,
                }
            })
            .collect()
    }

    /// Handle one inbound message end to end
    pub async fn handle(&self, message: InboundMessage) -> DispatchOutcome {
        let self_id = self.gateway.bot_info().id;
        let Some(request) = self.parser.parse(&message, &self_id) else {
            return DispatchOutcome::Ignored;
        };

        let trace = DispatchTrace::new();
        let span = tracing::info_span!(
            "dispatch",
            trace_id = %trace.trace_id(),
            message_id = %message.id,
        );

        async move {
            let mut trace = trace;
            let outcome = self.dispatch(&request, &mut trace).await;
            trace.add_field("outcome", outcome);
            trace.flush();
            outcome
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: &CommandRequest, trace: &mut DispatchTrace) -> DispatchOutcome {
        trace.add_field("channel", &request.channel_id);
        trace.add_field("author", &request.author_id);

        let roles = self.resolve_roles(request, trace).await;

        let Some((command, args)) = self.table.find(&request.text) else {
            tracing::debug!("No command matches {:?}", request.text);
            return DispatchOutcome::Unrecognized;
        };
        trace.add_field("command", &command.name);

        if let Some(flag) = &command.required_flag {
            let allowed = self.flags.evaluate(flag, &request.author_id, &roles);
            trace.add_field(format!("flags.{}", command.name), allowed);
            if !allowed {
                self.reply(request, &self.denied_text, trace).await;
                return DispatchOutcome::Denied;
            }
        }

        let run_span = tracing::info_span!("run_command", command = %command.name);
        let (text, outcome) = match command.handler.run(args).instrument(run_span).await {
            Ok(text) => (text, DispatchOutcome::Replied),
            Err(e) => {
                let detail = error_chain(&e);
                tracing::warn!("Command {} failed: {}", command.name, detail);
                trace.add_field("error", detail);
                (e.to_string(), DispatchOutcome::Failed)
            }
        };

        self.reply(request, &text, trace).await;
        outcome
    }

    /// Role lookup failures are recorded and treated as "no roles"
    async fn resolve_roles(&self, request: &CommandRequest, trace: &mut DispatchTrace) -> RoleSet {
        match self
            .gateway
            .member_roles(&request.guild_id, &request.author_id)
            .await
        {
            Ok(roles) => {
                trace.add_field("member.roles", &roles);
                roles
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to resolve roles for {} in {}: {}",
                    request.author_id,
                    request.guild_id,
                    e
                );
                trace.add_field("member.role.error", &e);
                trace.add_field("member.roles", RoleSet::empty());
                RoleSet::empty()
            }
        }
    }

    async fn reply(&self, request: &CommandRequest, text: &str, trace: &mut DispatchTrace) {
        trace.add_field("response", text);
        let span = tracing::info_span!("send_response", channel = %request.channel_id);
        let sent = self
            .gateway
            .send_message(&request.channel_id, text)
            .instrument(span)
            .await;
        if let Err(e) = sent {
            tracing::error!("Failed to send message: {}", e);
            trace.add_field("send.error", e);
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::{BackendError, BotError, CommandError};
    use crate::application::services::handlers::StaticReply;
    use crate::domain::entities::Command;
    use crate::domain::traits::BotInfo;
    use crate::test_support::SpanCapture;
    use async_trait::async_trait;

    struct StubGateway;

    #[async_trait]
    impl ChatGateway for StubGateway {
        async fn start(&self) -> Result<(), BotError> {
            Ok(())
        }

        async fn poll_messages(&self) -> Result<Vec<InboundMessage>, BotError> {
            Ok(Vec::new())
        }

        async fn send_message(&self, _channel_id: &str, _text: &str) -> Result<String, BotError> {
            Ok("sent-1".to_string())
        }

        async fn member_roles(&self, _guild_id: &str, _user_id: &str) -> Result<RoleSet, BotError> {
            Ok(RoleSet::empty())
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo {
                id: "bot".to_string(),
                ..BotInfo::default()
            }
        }
    }

    struct AllowAll;

    impl FeatureFlags for AllowAll {
        fn evaluate(&self, _flag_key: &str, _user_id: &str, _roles: &RoleSet) -> bool {
            true
        }
    }

    fn router(table: CommandTable) -> CommandRouter {
        CommandRouter::new("?", table, Arc::new(StubGateway), Arc::new(AllowAll))
    }

    #[test]
    fn help_lines_use_sigil_and_descriptions() {
        let table = CommandTable::new()
            .with(Command::new("ping", StaticReply::new("pong")).with_description("Check the bot is alive"))
            .with(Command::new("mc ", StaticReply::new("")).with_flag("mc-commands"));

        assert_eq!(
            router(table).help_lines(),
            vec![
                "?ping - Check the bot is alive".to_string(),
                "?mc (flag: mc-commands)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn reply_and_handler_run_in_child_spans() {
        let capture = SpanCapture::default();
        let _guard = capture.install();

        let table = CommandTable::new().with(Command::new("ping", StaticReply::new("pong")));
        let message = InboundMessage::new("user-1", "chan-9", "guild-1", "?ping");
        assert_eq!(router(table).handle(message).await, DispatchOutcome::Replied);

        assert!(capture.find("dispatch").is_some());
        let run = capture.find("run_command").expect("handler span");
        assert_eq!(run.field("command"), Some("ping"));
        let send = capture.find("send_response").expect("send span");
        assert_eq!(send.field("channel"), Some("chan-9"));
    }

    #[test]
    fn error_chain_includes_sources() {
        let e = CommandError::FactUnavailable(BackendError::Status(500));
        assert_eq!(error_chain(&e), "error getting cat fact: unexpected status: 500");
    }

    #[test]
    fn outcome_display() {
        assert_eq!(DispatchOutcome::Denied.to_string(), "denied");
        assert_eq!(DispatchOutcome::Replied.to_string(), "replied");
    }
}
