use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Broadcast hub fanning racha change events out to live subscribers.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_every_subscriber() {
        let hub = SseHub::new(4);
        hub.broadcast(ServerEvent {
            event: None,
            data: "dropped".into(),
        });

        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        hub.broadcast(ServerEvent {
            event: Some("racha.status_changed".into()),
            data: "{}".into(),
        });

        assert_eq!(first.try_recv().unwrap().data, "{}");
        assert_eq!(
            second.try_recv().unwrap().event.as_deref(),
            Some("racha.status_changed")
        );
    }
}
