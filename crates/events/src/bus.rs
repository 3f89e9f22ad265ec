//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application;
//! any number of subscribers independently receive every published
//! [`ExportEvent`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use guichet_core::types::DbId;

/// Event name published on a successful generation.
pub const EXPORT_GENERATED: &str = "export.generated";

/// Event name published when generation fails.
pub const EXPORT_FAILED: &str = "export.failed";

/// A lifecycle event of one export job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEvent {
    /// Dot-separated event name, e.g. `"export.generated"`.
    pub event_type: String,

    /// The export the event is about.
    pub export_id: DbId,

    /// Free-form JSON payload carrying event-specific data
    /// (dossier count, artifact path, error message).
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ExportEvent {
    pub fn new(event_type: impl Into<String>, export_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            export_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<ExportEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Never blocks; an
    /// event published with no subscriber is dropped silently.
    pub fn publish(&self, event: ExportEvent) {
        let receivers = self.sender.receiver_count();
        if let Err(err) = self.sender.send(event) {
            if receivers > 0 {
                tracing::warn!(error = %err, "event bus publish failed");
            }
        }
    }

    /// Subscribe to every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ExportEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            ExportEvent::new(EXPORT_GENERATED, 42)
                .with_payload(serde_json::json!({"dossiers_count": 3})),
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EXPORT_GENERATED);
        assert_eq!(event.export_id, 42);
        assert_eq!(event.payload["dossiers_count"], 3);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(ExportEvent::new(EXPORT_FAILED, 1));
    }
}
