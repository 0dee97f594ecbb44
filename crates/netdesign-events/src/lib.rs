use crossbeam_channel::{Receiver, Sender, unbounded};
use netdesign_core::{EdgeId, NodeId, PortId, SwitchRole};
use serde::{Deserialize, Serialize};

pub mod context;
pub mod telemetry;

pub use context::{BusyGuard, EditorContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Topology
    /// Node or edge set, or a node position, changed. Geometry must be recomputed.
    TopologyChanged,
    NodeAdded {
        id: NodeId,
    },
    NodeRemoved {
        id: NodeId,
    },
    LinkAdded {
        id: EdgeId,
    },
    LinkRemoved {
        id: EdgeId,
    },
    /// Both ends are concrete and the Backend accepted the link.
    LinkConnected {
        id: EdgeId,
    },
    RoleChanged {
        id: NodeId,
        role: SwitchRole,
    },

    // Connection protocol
    PortChoiceRequested {
        node: NodeId,
        ports: Vec<PortId>,
    },

    // Validation & simulation
    ValidationFinished {
        error_count: usize,
    },
    BandwidthExceeded {
        link_count: usize,
    },

    // Work indicator
    BusyChanged {
        busy: bool,
    },

    // Notifications
    ShowInfo {
        message: String,
    },
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
}

impl Event {
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            Event::ShowInfo { .. } | Event::ShowWarning { .. } | Event::ShowError { .. }
        )
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Takes every pending event without a listener.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_publish_drain() {
        let bus = EventBus::new();
        let other = bus.clone();
        other.publish(Event::NodeAdded {
            id: NodeId::new("S1"),
        });

        match bus.drain().as_slice() {
            [Event::NodeAdded { id }] => assert_eq!(id.as_str(), "S1"),
            other => panic!("Expected NodeAdded event, got {other:?}"),
        }
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_dispatch_to_listener() {
        struct Counter {
            errors: usize,
            total: usize,
        }

        impl EventListener for Counter {
            fn handle_event(&mut self, event: &Event) {
                self.total += 1;
                if matches!(event, Event::ShowError { .. }) {
                    self.errors += 1;
                }
            }
        }

        let bus = EventBus::new();
        bus.publish(Event::TopologyChanged);
        bus.publish(Event::ShowError {
            message: "Failed to create the link.".into(),
        });

        let mut counter = Counter {
            errors: 0,
            total: 0,
        };
        bus.dispatch_to(&mut counter);
        assert_eq!(counter.total, 2);
        assert_eq!(counter.errors, 1);
        assert!(bus.drain().is_empty());
    }
}
