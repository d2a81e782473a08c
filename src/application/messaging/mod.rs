//! Message handling - Parsing, routing and per-dispatch tracing

pub mod dispatcher;
pub mod parser;
pub mod trace;

pub use dispatcher::{CommandRouter, DispatchOutcome, DENIED_TEXT};
pub use parser::MessageParser;
pub use trace::DispatchTrace;
