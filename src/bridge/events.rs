use futures::channel::mpsc::UnboundedSender;
use log::debug;

use crate::device::types::ConnectionEvent;

/// Receiving end is held by the host's event-stream listener.
pub type EventSink = UnboundedSender<ConnectionEvent>;

/**
 * Fans normalized connection events out to the single active host listener.
 * The platform contract allows at most one listener, so attach replaces
 * rather than broadcasts. Delivery is best-effort and at-most-once: events
 * arriving while no sink is attached are dropped, never buffered or
 * replayed. Order of delivery equals order of emission.
 */
pub struct EventMux {
    sink: Option<EventSink>,
}

impl EventMux {
    pub fn new() -> EventMux {
        EventMux { sink: None }
    }

    /// Replaces any previously attached sink.
    pub fn attach(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    pub fn detach(&mut self) {
        self.sink = None;
    }

    pub fn emit(&mut self, event: ConnectionEvent) {
        match &self.sink {
            None => {
                debug!("No event sink attached, dropping {:?}", event);
            },
            Some(sink) => {
                // A receiver that went away without an explicit detach is
                // treated the same as a detach.
                if sink.unbounded_send(event).is_err() {
                    debug!("Event sink receiver is gone, detaching");
                    self.sink = None;
                }
            },
        }
    }
}

impl Default for EventMux {
    fn default() -> Self {
        EventMux::new()
    }
}
