//! # Notifications
//!
//! Human-readable status lines for people watching the colony. Lines are
//! rate limited by [`NotificationThrottle`], prefixed by their
//! [`MessageCategory`] glyph, and fanned out to the registered
//! [`Observers`].

pub mod category;
pub mod dispatcher;
pub mod throttle;

pub use category::MessageCategory;
pub use dispatcher::{ConsoleSink, MessageSink, Notifier, Observers};
pub use throttle::{NotificationThrottle, ThrottleEntry, ThrottleKey};
