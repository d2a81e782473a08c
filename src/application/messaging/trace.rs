//! Request-scoped observation context for a single dispatch

use std::fmt::Display;
use std::time::Instant;

use uuid::Uuid;

/// Structured fields gathered while a message is dispatched
///
/// Created per dispatch, passed down by reference, flushed once at the end.
#[derive(Debug)]
pub struct DispatchTrace {
    trace_id: Uuid,
    started: Instant,
    fields: Vec<(String, String)>,
}

impl DispatchTrace {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            started: Instant::now(),
            fields: Vec::new(),
        }
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    /// Record a field; a later value for the same key replaces the earlier one
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Emit the collected fields as one event
    pub fn flush(self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={:?}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        tracing::info!(
            trace_id = %self.trace_id,
            elapsed_ms,
            "dispatch finished: {}",
            fields
        );
    }
}

impl Default for DispatchTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_field_replaces_earlier() {
        let mut trace = DispatchTrace::new();
        trace.add_field("command", "ping");
        trace.add_field("flags.catfact", false);
        trace.add_field("command", "catfact");

        assert_eq!(trace.field("command"), Some("catfact"));
        assert_eq!(trace.field("flags.catfact"), Some("false"));
        assert_eq!(trace.field("author"), None);
    }

    #[test]
    fn each_trace_has_its_own_id() {
        assert_ne!(DispatchTrace::new().trace_id(), DispatchTrace::new().trace_id());
    }
}
