use crate::{Event, EventBus};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Notification sink and work indicator handed to every mutating editor
/// operation.
#[derive(Clone, Default)]
pub struct EditorContext {
    bus: EventBus,
    busy_depth: Arc<AtomicUsize>,
}

impl EditorContext {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            busy_depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notification");
        self.bus.publish(Event::ShowInfo { message });
    }

    pub fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "notification");
        self.bus.publish(Event::ShowWarning { message });
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "error notification");
        self.bus.publish(Event::ShowError { message });
    }

    pub fn is_busy(&self) -> bool {
        self.busy_depth.load(Ordering::SeqCst) > 0
    }

    /// Marks the editor busy until the guard is dropped. Nested guards keep it
    /// busy until the outermost one is released.
    pub fn busy(&self) -> BusyGuard {
        if self.busy_depth.fetch_add(1, Ordering::SeqCst) == 0 {
            debug!("busy");
            self.bus.publish(Event::BusyChanged { busy: true });
        }
        BusyGuard {
            bus: self.bus.clone(),
            depth: Arc::clone(&self.busy_depth),
        }
    }
}

#[must_use = "the editor is idle again as soon as the guard is dropped"]
pub struct BusyGuard {
    bus: EventBus,
    depth: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if self.depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            debug!("idle");
            self.bus.publish(Event::BusyChanged { busy: false });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_nests() {
        let ctx = EditorContext::new(EventBus::new());
        assert!(!ctx.is_busy());
        {
            let _outer = ctx.busy();
            let inner = ctx.busy();
            assert!(ctx.is_busy());
            drop(inner);
            assert!(ctx.is_busy());
        }
        assert!(!ctx.is_busy());
        assert_eq!(
            ctx.bus().drain(),
            vec![
                Event::BusyChanged { busy: true },
                Event::BusyChanged { busy: false }
            ]
        );
    }

    #[test]
    fn test_notifications_are_published() {
        let ctx = EditorContext::default();
        ctx.error("Failed to update the node.");
        ctx.info("done");
        let events = ctx.bus().drain();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(Event::is_notification));
        assert_eq!(
            events[0],
            Event::ShowError {
                message: "Failed to update the node.".into()
            }
        );
    }
}
