//! Observer registry and the throttled notifier that feeds it.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::category::MessageCategory;
use super::throttle::NotificationThrottle;

/// Something that can show a status line to a person: a connected player,
/// the server console, a test recorder.
pub trait MessageSink: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn deliver(&self, line: &str);
}

/// Sink that prints every line to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&self, line: &str) {
        println!("{line}");
    }
}

/// Registry of currently connected observers.
///
/// Shared between the host (which adds and removes observers as they come
/// and go) and the main loop (which dispatches to whoever is present).
#[derive(Debug, Default)]
pub struct Observers {
    sinks: RwLock<Vec<Arc<dyn MessageSink>>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sink: Arc<dyn MessageSink>) {
        debug!(observer = %sink.name(), "Observer registered");
        self.sinks.write().push(sink);
    }

    /// Remove every observer called `name`; returns how many were removed.
    pub fn unregister(&self, name: &str) -> usize {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|sink| sink.name() != name);
        before - sinks.len()
    }

    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }

    /// Send `line` to every observer; returns the number reached.
    pub fn dispatch(&self, line: &str) -> usize {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            sink.deliver(line);
        }
        sinks.len()
    }
}

/// Throttled, formatted delivery of status lines.
#[derive(Debug)]
pub struct Notifier {
    throttle: NotificationThrottle,
    observers: Arc<Observers>,
}

impl Notifier {
    pub fn new(observers: Arc<Observers>, cooldown: Duration, max_per_category: u32) -> Self {
        Self {
            throttle: NotificationThrottle::new(cooldown, max_per_category),
            observers,
        }
    }

    /// Offer a message for delivery. Returns whether it reached the
    /// dispatch step (it may still have had no observers).
    pub fn notify(
        &mut self,
        show_messages: bool,
        category: MessageCategory,
        message: &str,
        now: Instant,
    ) -> bool {
        if !show_messages {
            info!(category = %category, "{}", message);
            return false;
        }

        if !self.throttle.should_send_at(category, message, now) {
            debug!(category = %category, message = %message, "Notification throttled");
            return false;
        }

        let line = category.format(message);
        if self.observers.dispatch(&line) == 0 {
            debug!(category = %category, "No observers online: {}", message);
        }
        true
    }

    pub fn throttle(&self) -> &NotificationThrottle {
        &self.throttle
    }

    pub fn throttle_mut(&mut self) -> &mut NotificationThrottle {
        &mut self.throttle
    }

    pub fn observers(&self) -> &Arc<Observers> {
        &self.observers
    }
}
