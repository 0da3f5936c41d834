//! Structured diagnostic events around outbound calls.
//!
//! A [`Tracer`] is constructed once by the binary and handed to every
//! component that talks to the network, instead of living in process-wide
//! mutable state. Events are emitted through the `tracing` facade; whoever
//! wants to listen installs a subscriber (the bundled binary installs a
//! `tracing-subscriber` fmt listener). Enter and exit events around the
//! same call share a correlation identifier.

use tracing::info;
use uuid::Uuid;

const TARGET: &str = "service_client";

/// Handle for emitting enter/exit/information events. Cloning is cheap;
/// clones emit to the same subscriber.
#[derive(Debug, Clone, Default)]
pub struct Tracer;

/// Correlation token returned by [`Tracer::enter`], consumed by
/// [`Tracer::exit`] to close the pair.
#[derive(Debug)]
pub struct Invocation {
    id: String,
    operation: String,
}

impl Invocation {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of an outbound call, logging its named parameters.
    pub fn enter(&self, operation: &str, parameters: &[(&str, &str)]) -> Invocation {
        let id = Uuid::new_v4().to_simple().to_string();
        let parameters = parameters
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            target: TARGET,
            invocation = %id,
            operation = %operation,
            parameters = %parameters,
            "enter"
        );
        Invocation {
            id,
            operation: operation.to_owned(),
        }
    }

    /// Free-form informational message.
    pub fn information(&self, message: &str) {
        info!(target: TARGET, message = %message, "information");
    }

    /// Marks the end of the call started by `invocation` with a short
    /// result summary. The summary must never contain secret material;
    /// callers redact before passing it in.
    pub fn exit(&self, invocation: &Invocation, result: &str) {
        info!(
            target: TARGET,
            invocation = %invocation.id,
            operation = %invocation.operation,
            result = %result,
            "exit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocations_get_distinct_ids() {
        let tracer = Tracer::new();
        let first = tracer.enter("Op", &[]);
        let second = tracer.enter("Op", &[]);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn invocation_id_is_compact_hex() {
        let tracer = Tracer::new();
        let invocation = tracer.enter("Op", &[("key", "value")]);
        assert_eq!(invocation.id().len(), 32);
        assert!(invocation.id().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
